//! DEX Price Collector - Entry Point
//!
//! Loads configuration, starts the collector service and the HTTP
//! surface, then runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml (or `$COLLECTOR_CONFIG`) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Start CollectorService (sources, stores, seed venues, scheduler)
//! 4. Spawn HTTP server (API, /live, /ready, /metrics)
//! 5. Wait for SIGINT → graceful shutdown (scheduler, then HTTP)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use dex_price_collector::adapters::http;
use dex_price_collector::config::loader::{config_path, load_config};
use dex_price_collector::service::CollectorService;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ────────────────────────────────
    let path = config_path("config.toml");
    let config = load_config(&path).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        config = %path,
        venues = config.venues.len(),
        interval_s = config.scheduler.interval_seconds,
        "Starting DEX price collector"
    );

    // ── 3. Shutdown signal channel ───────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(4);

    // ── 4. Bind HTTP before seeding so a bad address fails fast ──
    let listener = TcpListener::bind(&config.http.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.http.bind_address))?;

    // ── 5. Start the collector ──────────────────────────────
    let service = CollectorService::start(&config, shutdown_tx.clone())
        .await
        .context("Failed to start collector service")?;

    // ── 6. Spawn HTTP server ────────────────────────────────
    let http_shutdown = shutdown_tx.subscribe();
    let http_service = std::sync::Arc::clone(&service);
    let http_handle = tokio::spawn(async move {
        if let Err(e) = http::serve(listener, http_service, http_shutdown).await {
            error!(error = %e, "HTTP server failed");
        }
    });

    info!("Collector running");

    // ── 7. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT, shutting down");
    } else {
        info!("SIGINT received, initiating graceful shutdown");
    }

    // ── Graceful shutdown ────────────────────────────────────
    // Stops the scheduler (an active run completes) and signals HTTP.
    service.shutdown().await;

    let _ = tokio::time::timeout(Duration::from_secs(10), http_handle).await;

    info!("Shutdown complete");
    Ok(())
}
