use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::errors::ConfigurationError;
use crate::shard::hasher::{BuiltinHasher, Fnv1a64, HashPrimitive};
use crate::shard::skeleton::SkeletonRendezvous;

pub const DEFAULT_FAN_OUT: usize = 3;
pub const DEFAULT_CLUSTER_SIZE: usize = 2;
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

pub const ENV_FAN_OUT: &str = "SKELHRW_FAN_OUT";
pub const ENV_CLUSTER_SIZE: &str = "SKELHRW_CLUSTER_SIZE";
pub const ENV_MIN_CLUSTER_SIZE: &str = "SKELHRW_MIN_CLUSTER_SIZE";
pub const ENV_HASH: &str = "SKELHRW_HASH";

/// Hash primitives selectable by name.
#[derive(EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Fnv1a64,
    XxHash64,
}

/// Construction options for a [`SkeletonRendezvous`].
///
/// Start from `Options::default()` and override what you need:
///
/// ```
/// use skelhrw_core::Options;
/// use skelhrw_core::shard::hasher::XxHash64Hasher;
///
/// let options = Options::default()
///     .fan_out(4)
///     .cluster_size(8)
///     .min_cluster_size(4)
///     .hasher(XxHash64Hasher::with_seed(17));
///
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Options<H = Fnv1a64> {
    /// Children per level of the virtual tree.
    pub(crate) fan_out: usize,
    pub(crate) hasher: H,
    /// Nodes placed in each cluster before a new one is started.
    pub(crate) cluster_size: usize,
    /// A trailing cluster smaller than this is merged into the others.
    pub(crate) min_cluster_size: usize,
}

impl Default for Options<Fnv1a64> {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            hasher: Fnv1a64::new(),
            cluster_size: DEFAULT_CLUSTER_SIZE,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
        }
    }
}

impl<H: HashPrimitive> Options<H> {
    pub fn fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    pub fn cluster_size(mut self, size: usize) -> Self {
        self.cluster_size = size;
        self
    }

    pub fn min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    /// Swaps the hash primitive, keeping every other option.
    pub fn hasher<G: HashPrimitive>(self, hasher: G) -> Options<G> {
        Options {
            fan_out: self.fan_out,
            hasher,
            cluster_size: self.cluster_size,
            min_cluster_size: self.min_cluster_size,
        }
    }

    pub fn get_fan_out(&self) -> usize {
        self.fan_out
    }

    pub fn get_cluster_size(&self) -> usize {
        self.cluster_size
    }

    pub fn get_min_cluster_size(&self) -> usize {
        self.min_cluster_size
    }

    pub fn get_hasher(&self) -> &H {
        &self.hasher
    }

    /// Rejects option combinations the partitioner or the tree cannot work
    /// with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.fan_out < 2 {
            return Err(ConfigurationError::InvalidFanOut(self.fan_out));
        }
        if self.cluster_size < 1 {
            return Err(ConfigurationError::InvalidClusterSize(self.cluster_size));
        }
        if self.min_cluster_size > self.cluster_size {
            return Err(ConfigurationError::MinClusterSizeTooLarge {
                min: self.min_cluster_size,
                size: self.cluster_size,
            });
        }
        Ok(())
    }
}

/// Plain-data configuration, suitable for files and the environment.
///
/// Missing fields fall back to the same defaults as [`Options::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fan_out: usize,
    pub cluster_size: usize,
    pub min_cluster_size: usize,
    pub hash: HashAlgorithm,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            cluster_size: DEFAULT_CLUSTER_SIZE,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            hash: HashAlgorithm::default(),
        }
    }
}

impl Settings {
    /// Reads `SKELHRW_*` variables on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup(ENV_FAN_OUT) {
            settings.fan_out = parse_value(ENV_FAN_OUT, &value)?;
        }
        if let Some(value) = lookup(ENV_CLUSTER_SIZE) {
            settings.cluster_size = parse_value(ENV_CLUSTER_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_MIN_CLUSTER_SIZE) {
            settings.min_cluster_size = parse_value(ENV_MIN_CLUSTER_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_HASH) {
            settings.hash = parse_value(ENV_HASH, &value)?;
        }

        Ok(settings)
    }

    pub fn options(&self) -> Options<BuiltinHasher> {
        Options::default()
            .fan_out(self.fan_out)
            .cluster_size(self.cluster_size)
            .min_cluster_size(self.min_cluster_size)
            .hasher(BuiltinHasher::from(self.hash))
    }

    pub fn build(&self) -> Result<SkeletonRendezvous<BuiltinHasher>, ConfigurationError> {
        SkeletonRendezvous::new(self.options())
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidValue { key, value: value.to_owned() })
}
