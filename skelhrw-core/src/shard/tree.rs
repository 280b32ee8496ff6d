use std::fmt;

use crate::shard::hasher::{HashPrimitive, digest};

/// A root-to-leaf path through the virtual tree.
///
/// Holds one digit in `0..fan_out` per level, most significant first. The
/// empty branch addresses the only cluster of a depth-0 tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branch {
    digits: Vec<usize>,
}

impl Branch {
    pub fn from_digits(digits: Vec<usize>) -> Self {
        Self { digits }
    }

    pub fn digits(&self) -> &[usize] {
        &self.digits
    }

    pub fn depth(&self) -> usize {
        self.digits.len()
    }

    /// Maps the branch onto a cluster table of `cluster_count` entries.
    ///
    /// The digits are read as a base-`fan_out` numeral. The tree usually has
    /// more leaves than there are clusters, so the value is folded back with
    /// `mod cluster_count`; the result is always a valid index. Returns
    /// `None` only when `cluster_count` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use skelhrw_core::shard::tree::Branch;
    ///
    /// // "21" in base 3 is 7, which folds onto cluster 2 of 5.
    /// assert_eq!(Branch::from_digits(vec![2, 1]).resolve(3, 5), Some(2));
    /// assert_eq!(Branch::default().resolve(3, 1), Some(0));
    /// ```
    pub fn resolve(&self, fan_out: usize, cluster_count: usize) -> Option<usize> {
        if cluster_count == 0 {
            return None;
        }

        // Folding at every step keeps the accumulator below
        // `cluster_count * fan_out` and yields the same residue.
        let index = self
            .digits
            .iter()
            .fold(0usize, |acc, &digit| (acc * fan_out + digit) % cluster_count);

        Some(index)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in &self.digits {
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}

/// Label hashed against the key when scoring `digit` at `level`.
///
/// Decimal level immediately followed by decimal digit, so labels are not
/// unique once either side reaches two digits (level 1 digit 11 and level 11
/// digit 1 both read "111").
fn path_label(level: usize, digit: usize) -> String {
    format!("{}{}", level, digit)
}

/// Walks `depth` levels of a `fan_out`-ary tree for `key`.
///
/// At each level every digit is scored with `hash(label ++ key)` and the
/// strictly highest score wins, which leaves ties with the lowest digit.
/// Costs `fan_out * depth` digests regardless of how many nodes exist.
pub fn select_branch<H: HashPrimitive>(
    hasher: &mut H,
    key: &str,
    depth: usize,
    fan_out: usize,
) -> Branch {
    let mut digits = Vec::with_capacity(depth);

    for level in 0..depth {
        let mut best_digit = 0;
        let mut best_score = digest(hasher, path_label(level, 0).as_bytes(), key.as_bytes());

        for digit in 1..fan_out {
            let score = digest(hasher, path_label(level, digit).as_bytes(), key.as_bytes());
            if score > best_score {
                best_score = score;
                best_digit = digit;
            }
        }

        digits.push(best_digit);
    }

    Branch { digits }
}
