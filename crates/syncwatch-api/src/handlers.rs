//! Route handlers.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::debug;

use crate::ApiState;

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = state.sink.render().await;
    debug!(bytes = body.len(), "metrics scraped");
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, syncwatch_metrics::CONTENT_TYPE)],
        body,
    )
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}
