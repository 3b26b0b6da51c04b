//! Exporter configuration.
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! file, and command-line flags / environment variables. The daemon
//! applies them in that order and calls [`ExporterConfig::validate`]
//! before anything starts.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::types::TargetDescriptor;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fully resolved exporter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    /// Controllers to poll, in configured order.
    pub targets: Vec<TargetDescriptor>,
    /// Port the metrics endpoint listens on.
    pub port: u16,
    /// Pause between the end of one cycle and the start of the next.
    pub poll_interval: Duration,
    /// Upper bound on a single listing request.
    pub fetch_timeout: Duration,
    /// Verify controller TLS certificates. Off by default: controllers are
    /// usually reached on internal endpoints with self-signed certificates.
    pub tls_verify: bool,
    /// Optional namespace prepended to every metric name (`<prefix>_up`).
    pub metric_prefix: Option<String>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            port: DEFAULT_PORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            tls_verify: false,
            metric_prefix: None,
        }
    }
}

impl ExporterConfig {
    /// Parse a JSON array of `{"server": ..., "token": ...}` objects.
    pub fn parse_targets(raw: &str) -> ConfigResult<Vec<TargetDescriptor>> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Layer a config file over the current settings.
    ///
    /// File targets are appended after any already present.
    pub fn merge_file(&mut self, file: FileConfig) {
        self.targets.extend(file.targets);
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(secs) = file.poll_interval {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.fetch_timeout {
            self.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(verify) = file.tls_verify {
            self.tls_verify = verify;
        }
        if file.metric_prefix.is_some() {
            self.metric_prefix = file.metric_prefix;
        }
    }

    /// Reject settings the exporter cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        for (index, target) in self.targets.iter().enumerate() {
            let endpoint = target.endpoint.trim();
            if endpoint.is_empty() {
                return Err(ConfigError::EmptyEndpoint { index });
            }
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::InvalidEndpoint {
                    index,
                    endpoint: target.endpoint.clone(),
                });
            }
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll_interval"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("fetch_timeout"));
        }
        if let Some(prefix) = &self.metric_prefix {
            if !is_valid_prefix(prefix) {
                return Err(ConfigError::InvalidPrefix(prefix.clone()));
            }
        }
        Ok(())
    }
}

/// On-disk TOML layout. Every scalar is optional.
///
/// ```toml
/// port = 9100
/// poll_interval = 60
///
/// [[targets]]
/// server = "https://argocd.internal"
/// token = "..."
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    /// Seconds.
    pub poll_interval: Option<u64>,
    /// Seconds.
    pub fetch_timeout: Option<u64>,
    pub tls_verify: Option<bool>,
    pub metric_prefix: Option<String>,
    #[serde(default)]
    pub targets: Vec<TargetDescriptor>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Metric name prefixes follow the exposition format's name grammar,
/// minus the colon reserved for recording rules.
fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
