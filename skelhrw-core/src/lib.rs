//! Rendezvous (highest-random-weight) hashing over a cluster skeleton.
//!
//! Nodes are grouped into fixed-size clusters. A key first walks a virtual
//! `fan_out`-ary tree, one hash decision per level, to pick a cluster, and
//! then classic HRW picks the node inside that cluster. Lookups therefore
//! cost `fan_out * depth + cluster_size` digests, where `depth` grows with
//! the logarithm of the cluster count.
//!
//! ```
//! use skelhrw_core::{Options, SkeletonRendezvous};
//!
//! let mut skeleton = SkeletonRendezvous::new(Options::default().cluster_size(3)).unwrap();
//! skeleton.set_nodes(["n1", "n2", "n3", "n4", "n5", "n6"]);
//!
//! let owner = skeleton.find_node("tenant:7").unwrap();
//! assert!(skeleton.nodes().iter().any(|n| n == owner));
//! ```

pub mod config;
pub mod errors;
pub mod shard;

pub use config::{HashAlgorithm, Options, Settings};
pub use errors::{ConfigurationError, LookupError};
pub use shard::hasher::{BuiltinHasher, Fnv1a64, HashPrimitive, XxHash64Hasher};
pub use shard::skeleton::{Remap, SkeletonRendezvous};
pub use shard::tree::Branch;
