//! Command-line flags and their environment fallbacks.

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{Parser, ValueEnum};

use syncwatch_core::{ConfigResult, ExporterConfig, FileConfig};

#[derive(Debug, Parser)]
#[command(
    name = "syncwatchd",
    version,
    about = "Export GitOps controller application health as Prometheus metrics"
)]
pub struct Cli {
    /// JSON array of controller targets: [{"server": "...", "token": "..."}].
    #[arg(long, env = "ARGOCD_CONFIG")]
    pub targets: Option<String>,

    /// TOML config file. Flags and environment variables take precedence.
    #[arg(long, env = "SYNCWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port for the /metrics endpoint [default: 8000].
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Seconds to wait between poll cycles [default: 30].
    #[arg(long, env = "POLL_INTERVAL")]
    pub poll_interval: Option<u64>,

    /// Per-request timeout in seconds [default: 10].
    #[arg(long, env = "FETCH_TIMEOUT")]
    pub fetch_timeout: Option<u64>,

    /// Verify controller TLS certificates [default: false].
    /// Accepts true/false, yes/no, on/off and 1/0.
    #[arg(
        long,
        env = "TLS_VERIFY",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub tls_verify: Option<bool>,

    /// Namespace prepended to metric names, e.g. `argocd`.
    #[arg(long, env = "METRIC_PREFIX")]
    pub metric_prefix: Option<String>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// Resolve defaults, the config file and flags into a validated config.
    pub fn resolve(&self) -> ConfigResult<ExporterConfig> {
        let mut config = ExporterConfig::default();

        if let Some(raw) = &self.targets {
            config.targets = ExporterConfig::parse_targets(raw)?;
        }
        if let Some(path) = &self.config {
            config.merge_file(FileConfig::from_file(path)?);
        }

        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(secs) = self.poll_interval {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.fetch_timeout {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(verify) = self.tls_verify {
            config.tls_verify = verify;
        }
        if let Some(prefix) = self.metric_prefix.as_deref().filter(|p| !p.is_empty()) {
            config.metric_prefix = Some(prefix.to_string());
        }

        config.validate()?;
        Ok(config)
    }
}
