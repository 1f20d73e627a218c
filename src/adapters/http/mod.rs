//! HTTP Surface - axum 0.7 Router
//!
//! One server for the collector API, health probes and Prometheus
//! metrics. Shuts down gracefully on the broadcast signal.
//!
//! Sub-modules:
//! - `api`: price queries, venue registration, run trigger
//! - `health`: liveness, readiness, metrics exposition

pub mod api;
pub mod health;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::service::CollectorService;

/// Build the router over a running service.
pub fn router(service: Arc<CollectorService>) -> Router {
  Router::new()
    .route("/prices", get(api::list_prices))
    .route("/prices/latest", get(api::latest_price))
    .route("/venues", get(api::list_venues).post(api::register_venue))
    .route("/runs", axum::routing::post(api::trigger_run))
    .route("/live", get(health::liveness))
    .route("/ready", get(health::readiness))
    .route("/metrics", get(health::metrics))
    .with_state(service)
}

/// Serve on an already-bound listener until shutdown.
#[instrument(skip_all)]
pub async fn serve(
  listener: TcpListener,
  service: Arc<CollectorService>,
  mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
  info!(address = %listener.local_addr()?, "HTTP server started");

  axum::serve(listener, router(service))
    .with_graceful_shutdown(async move {
      let _ = shutdown_rx.recv().await;
    })
    .await?;

  Ok(())
}
