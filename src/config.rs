//! Depot configuration.
//!
//! Physical depot parameters shared by the pattern oracle and lane-list
//! validation. Loaded from JSON; every field has a default matching the
//! depot the engine was built for (12 lanes of 6 bus slots).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{TypeCatalogue, DEFAULT_TYPE_PREFIX_LEN};

/// Physical depot parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepotConfig {
    /// Number of physical lanes (outside spots excluded).
    pub lane_count: usize,
    /// Bus slots per physical lane.
    pub lane_capacity: usize,
    /// Allowed positional deviation, passed through to the pattern oracle.
    pub max_deviation: usize,
    /// Leading identifier characters that encode the vehicle type.
    pub type_prefix_len: usize,
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            lane_count: 12,
            lane_capacity: 6,
            max_deviation: 5,
            type_prefix_len: DEFAULT_TYPE_PREFIX_LEN,
        }
    }
}

/// A configuration that could not be loaded.
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON document is malformed.
    Parse(serde_json::Error),
    /// A field has an unusable value.
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid depot configuration: {e}"),
            Self::Invalid { field, message } => {
                write!(f, "invalid depot configuration field '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl DepotConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of physical lanes.
    pub fn with_lane_count(mut self, lane_count: usize) -> Self {
        self.lane_count = lane_count;
        self
    }

    /// Sets the bus slots per lane.
    pub fn with_lane_capacity(mut self, lane_capacity: usize) -> Self {
        self.lane_capacity = lane_capacity;
        self
    }

    /// Sets the oracle's allowed positional deviation.
    pub fn with_max_deviation(mut self, max_deviation: usize) -> Self {
        self.max_deviation = max_deviation;
        self
    }

    /// Sets the type prefix length.
    pub fn with_type_prefix_len(mut self, type_prefix_len: usize) -> Self {
        self.type_prefix_len = type_prefix_len;
        self
    }

    /// Parses and checks a configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// The standard fleet catalogue, parsing with this depot's prefix length.
    pub fn standard_types(&self) -> TypeCatalogue {
        TypeCatalogue::standard().with_prefix_len(self.type_prefix_len)
    }

    /// Rejects values no depot can have.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.lane_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "lane_capacity",
                message: "must be at least 1".into(),
            });
        }
        if self.type_prefix_len == 0 {
            return Err(ConfigError::Invalid {
                field: "type_prefix_len",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
