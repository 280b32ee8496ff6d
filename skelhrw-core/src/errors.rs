use thiserror::Error;

/// Errors raised while building a skeleton from its options.
///
/// These only surface at construction time; a skeleton that was built
/// successfully never reports a configuration error afterwards.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("fan-out must be at least 2, got {0}")]
    InvalidFanOut(usize),

    #[error("cluster size must be at least 1, got {0}")]
    InvalidClusterSize(usize),

    #[error("minimum cluster size {min} exceeds cluster size {size}")]
    MinClusterSizeTooLarge { min: usize, size: usize },

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Errors related to resolving a key against the current topology
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("topology is empty, no node can own a key")]
    EmptyTopology,

    #[error("cluster {0} has no members")]
    NodeNotFound(usize),
}
