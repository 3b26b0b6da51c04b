//! Fetch error types.

use thiserror::Error;

/// Result type alias for a single target fetch.
pub type FetchResult<T> = Result<T, FetchError>;

/// Why one target produced no application listing this cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {target} failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{target} returned HTTP {status}")]
    Status { target: String, status: u16 },

    #[error("invalid response from {target}: {reason}")]
    Decode { target: String, reason: String },
}

impl FetchError {
    /// Endpoint of the target that failed.
    pub fn target(&self) -> &str {
        match self {
            Self::Transport { target, .. }
            | Self::Status { target, .. }
            | Self::Decode { target, .. } => target,
        }
    }
}
