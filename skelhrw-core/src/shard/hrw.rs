use crate::shard::hasher::{HashPrimitive, digest};
use crate::shard::types::NodeId;

/// Classic highest-random-weight pick among `nodes`.
///
/// Every member scores `hash(node ++ key)`; the strictly highest score wins,
/// so on a tie the member seen first keeps the slot. Returns `None` for an
/// empty slice.
pub fn highest_random_weight<'a, H: HashPrimitive>(
    hasher: &mut H,
    key: &str,
    nodes: &'a [NodeId],
) -> Option<&'a str> {
    let (first, rest) = nodes.split_first()?;

    let mut best = first.as_str();
    let mut best_score = digest(hasher, first.as_bytes(), key.as_bytes());

    for node in rest {
        let score = digest(hasher, node.as_bytes(), key.as_bytes());
        if score > best_score {
            best_score = score;
            best = node.as_str();
        }
    }

    Some(best)
}
