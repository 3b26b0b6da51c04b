//! syncwatchd — the syncwatch exporter daemon.
//!
//! Polls every configured controller on a fixed interval and serves the
//! resulting application health snapshot on `/metrics`.
//!
//! # Usage
//!
//! ```text
//! ARGOCD_CONFIG='[{"server":"https://argocd.internal","token":"..."}]' \
//!     syncwatchd --port 8000 --poll-interval 30
//! ```

mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use syncwatch_collector::{Collector, HttpAppSource, Scheduler};
use syncwatch_core::ExporterConfig;
use syncwatch_metrics::MetricSink;

use crate::cli::{Cli, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "config validation failed");
            return Err(e.into());
        }
    };

    run(config).await
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,syncwatchd=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().flatten_event(true).init(),
    }
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    info!(
        targets = config.targets.len(),
        port = config.port,
        poll_interval_secs = config.poll_interval.as_secs(),
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        tls_verify = config.tls_verify,
        "syncwatch exporter starting"
    );
    if config.targets.is_empty() {
        warn!("no controller targets configured");
    }

    // ── Initialize subsystems ──────────────────────────────────

    let sink = Arc::new(MetricSink::with_prefix(config.metric_prefix.clone()));
    let source = Arc::new(HttpAppSource::new(config.fetch_timeout, config.tls_verify)?);
    let collector = Collector::new(config.targets.clone(), source, Arc::clone(&sink));
    let scheduler = Scheduler::new(collector, config.poll_interval);

    // Bind before polling so a busy port fails startup cleanly.
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "metrics endpoint listening");

    // ── Background poll loop ───────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(shutdown_rx).await;
    });

    // ── Metrics endpoint ───────────────────────────────────────

    let router = syncwatch_api::build_router(sink);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    let _ = scheduler_handle.await;

    info!("syncwatch exporter stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
