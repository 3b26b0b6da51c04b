//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that prevent the exporter from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid target list: {0}")]
    InvalidTargets(#[from] serde_json::Error),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("target #{index} has an empty server URL")]
    EmptyEndpoint { index: usize },

    #[error("target #{index} server must be an http(s) URL: {endpoint}")]
    InvalidEndpoint { index: usize, endpoint: String },

    #[error("invalid metric prefix {0:?}: expected [a-zA-Z_][a-zA-Z0-9_]*")]
    InvalidPrefix(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
