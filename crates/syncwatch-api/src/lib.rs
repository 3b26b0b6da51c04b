//! syncwatch-api — HTTP routes served by the exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition of the current snapshot |
//! | GET | `/healthz` | Liveness probe |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use syncwatch_metrics::MetricSink;

/// Shared state for route handlers.
#[derive(Clone)]
pub struct ApiState {
    pub sink: Arc<MetricSink>,
}

/// Build the exporter router.
pub fn build_router(sink: Arc<MetricSink>) -> Router {
    Router::new()
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/healthz", get(handlers::healthz))
        .with_state(ApiState { sink })
}
