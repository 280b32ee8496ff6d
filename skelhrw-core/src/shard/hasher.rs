use std::fmt;
use std::hash::Hasher;

use twox_hash::XxHash64;

use crate::config::HashAlgorithm;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A resettable, streaming 64-bit hash.
///
/// The skeleton keeps one configured instance as a prototype and clones it
/// for every lookup, so `clone` only has to produce a hasher with the same
/// parameters. Its running state is irrelevant because every score starts
/// with `reset`.
pub trait HashPrimitive: Clone {
    /// Drops any bytes fed so far.
    fn reset(&mut self);

    /// Feeds `bytes` into the running state.
    fn write(&mut self, bytes: &[u8]);

    /// Returns the digest of everything written since the last reset.
    fn sum64(&self) -> u64;
}

/// Hashes `target` immediately followed by `key`.
///
/// There is no delimiter between the two inputs, so pairs whose
/// concatenations are byte-identical collide: `("1", "23")` and `("12", "3")`
/// produce the same score.
///
/// # Examples
///
/// ```
/// use skelhrw_core::shard::hasher::{Fnv1a64, digest};
///
/// let mut hasher = Fnv1a64::new();
/// assert_eq!(digest(&mut hasher, b"1", b"23"), digest(&mut hasher, b"12", b"3"));
/// ```
#[inline]
pub fn digest<H: HashPrimitive>(hasher: &mut H, target: &[u8], key: &[u8]) -> u64 {
    hasher.reset();
    hasher.write(target);
    hasher.write(key);
    hasher.sum64()
}

/// 64-bit FNV-1a.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv1a64 {
    state: u64,
}

impl Fnv1a64 {
    pub fn new() -> Self {
        Self { state: FNV_OFFSET_BASIS }
    }
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self::new()
    }
}

impl HashPrimitive for Fnv1a64 {
    fn reset(&mut self) {
        self.state = FNV_OFFSET_BASIS;
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    fn sum64(&self) -> u64 {
        self.state
    }
}

/// Seeded xxHash64.
///
/// Cloning yields a freshly reset hasher with the same seed.
pub struct XxHash64Hasher {
    seed: u64,
    inner: XxHash64,
}

impl XxHash64Hasher {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, inner: XxHash64::with_seed(seed) }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for XxHash64Hasher {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Clone for XxHash64Hasher {
    fn clone(&self) -> Self {
        Self::with_seed(self.seed)
    }
}

impl fmt::Debug for XxHash64Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XxHash64Hasher").field("seed", &self.seed).finish()
    }
}

impl HashPrimitive for XxHash64Hasher {
    fn reset(&mut self) {
        self.inner = XxHash64::with_seed(self.seed);
    }

    fn write(&mut self, bytes: &[u8]) {
        Hasher::write(&mut self.inner, bytes);
    }

    fn sum64(&self) -> u64 {
        self.inner.finish()
    }
}

/// One of the hash primitives shipped with the crate, chosen at runtime.
#[derive(Debug, Clone)]
pub enum BuiltinHasher {
    Fnv1a64(Fnv1a64),
    XxHash64(XxHash64Hasher),
}

impl From<HashAlgorithm> for BuiltinHasher {
    fn from(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Fnv1a64 => BuiltinHasher::Fnv1a64(Fnv1a64::new()),
            HashAlgorithm::XxHash64 => BuiltinHasher::XxHash64(XxHash64Hasher::default()),
        }
    }
}

impl HashPrimitive for BuiltinHasher {
    fn reset(&mut self) {
        match self {
            BuiltinHasher::Fnv1a64(h) => h.reset(),
            BuiltinHasher::XxHash64(h) => h.reset(),
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        match self {
            BuiltinHasher::Fnv1a64(h) => h.write(bytes),
            BuiltinHasher::XxHash64(h) => h.write(bytes),
        }
    }

    fn sum64(&self) -> u64 {
        match self {
            BuiltinHasher::Fnv1a64(h) => h.sum64(),
            BuiltinHasher::XxHash64(h) => h.sum64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fnv(bytes: &[u8]) -> u64 {
        let mut h = Fnv1a64::new();
        h.write(bytes);
        h.sum64()
    }

    #[test]
    fn fnv1a_known_vectors() {
        assert_eq!(fnv(b""), 0xcbf29ce484222325);
        assert_eq!(fnv(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn digest_resets_between_calls() {
        let mut h = Fnv1a64::new();
        let first = digest(&mut h, b"jg1", b"key");
        let second = digest(&mut h, b"jg1", b"key");
        assert_eq!(first, second);
        assert_eq!(first, fnv(b"jg1key"));
    }

    #[test]
    fn digest_concatenation_collides() {
        let mut h = Fnv1a64::new();
        assert_eq!(digest(&mut h, b"1", b"23"), digest(&mut h, b"12", b"3"));

        let mut x = XxHash64Hasher::with_seed(7);
        assert_eq!(digest(&mut x, b"1", b"23"), digest(&mut x, b"12", b"3"));
    }

    #[test]
    fn xxhash_streaming_matches_one_shot() {
        let mut x = XxHash64Hasher::with_seed(42);
        let streamed = digest(&mut x, b"node-a", b"user:1001");

        let mut one_shot = XxHash64::with_seed(42);
        Hasher::write(&mut one_shot, b"node-auser:1001");
        assert_eq!(streamed, one_shot.finish());
    }

    #[test]
    fn xxhash_clone_keeps_seed() {
        let mut x = XxHash64Hasher::with_seed(9);
        x.write(b"garbage");
        let mut cloned = x.clone();
        assert_eq!(cloned.seed(), 9);
        assert_eq!(digest(&mut cloned, b"a", b"b"), digest(&mut x, b"a", b"b"));
    }

    #[test]
    fn builtin_dispatches_to_selected_algorithm() {
        let mut fnv_builtin = BuiltinHasher::from(HashAlgorithm::Fnv1a64);
        let mut plain = Fnv1a64::new();
        assert_eq!(digest(&mut fnv_builtin, b"a", b"b"), digest(&mut plain, b"a", b"b"));

        let mut xx_builtin = BuiltinHasher::from(HashAlgorithm::XxHash64);
        let mut xx = XxHash64Hasher::default();
        assert_eq!(digest(&mut xx_builtin, b"a", b"b"), digest(&mut xx, b"a", b"b"));
    }
}
