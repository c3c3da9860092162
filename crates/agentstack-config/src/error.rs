//! Error types for configuration resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration.
///
/// All of these indicate a static defect in the configuration; none are
/// worth retrying.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingRequiredKey(String),

    #[error("either SEMAPHORE_ENDPOINT or SEMAPHORE_ORGANIZATION must be set")]
    ContradictoryEndpointConfig,

    #[error("SEMAPHORE_AGENT_SUBNETS is required when SEMAPHORE_AGENT_VPC_ID is set")]
    MissingSubnetsForNetwork,

    #[error("config file {} does not exist", .0.display())]
    ConfigSourceNotFound(PathBuf),

    #[error("failed to parse config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for {key}: {value:?} ({expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl Into<String>, expected: &'static str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.into(),
            expected,
        }
    }
}
