//! Health and Metrics Probes - /live, /ready, /metrics
//!
//! Liveness always answers while the process runs. Readiness follows
//! the price store (a collector that cannot write is not ready).

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::error;

use crate::service::CollectorService;

/// Liveness probe: always returns 200 if the process is running.
pub async fn liveness() -> impl IntoResponse {
  (StatusCode::OK, "OK")
}

/// Readiness probe: returns 200 only if the price store is writable.
pub async fn readiness(State(service): State<Arc<CollectorService>>) -> impl IntoResponse {
  if service.is_ready().await {
    (StatusCode::OK, "READY")
  } else {
    (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
  }
}

/// Prometheus text exposition.
pub async fn metrics(State(service): State<Arc<CollectorService>>) -> impl IntoResponse {
  match service.metrics().render() {
    Ok(text) => (
      StatusCode::OK,
      [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
      text,
    )
      .into_response(),
    Err(e) => {
      error!(error = %e, "Failed to encode metrics");
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}
