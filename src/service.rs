//! Collector Service - Lifecycle and Composition Root
//!
//! Builds the adapters, opens the stores, wires the use cases and owns
//! the periodic trigger. Everything the HTTP surface does goes through
//! this type, so metrics are recorded in one place.
//!
//! Lifecycle:
//! 1. `start`: construct sources and stores, seed configured venues
//!    through the validation gate, spawn the scheduler
//! 2. serve requests (`register`, `trigger_run`, queries)
//! 3. `shutdown`: signal the scheduler and await it

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::adapters::chain::{OnChainRpcSource, RpcProviders};
use crate::adapters::dom::{DomRenderSource, WebDriverClient};
use crate::adapters::metrics::MetricsRegistry;
use crate::adapters::persistence::{PriceLog, VenueStore};
use crate::adapters::rest::{RestApiSource, RestClient};
use crate::config::{AppConfig, VenueSeed};
use crate::domain::{PriceRecord, RegistrationError, StoreError, Venue, VenueCandidate};
use crate::ports::{PriceQuery, PriceRepository, PriceSource, VenueRepository};
use crate::usecases::scheduler::{self, RunObserver, Schedule};
use crate::usecases::{Orchestrator, Registration, RunError, RunOutcome, SourceRouter, VenueRegistry};

/// Outcome of seeding configured venues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
  pub registered: usize,
  /// Already present in the registry.
  pub existing: usize,
  /// Rejected by the gate (logged).
  pub rejected: usize,
}

/// The running collector.
pub struct CollectorService {
  registry: VenueRegistry,
  orchestrator: Arc<Orchestrator>,
  prices: Arc<dyn PriceRepository>,
  metrics: Arc<MetricsRegistry>,
  shutdown_tx: broadcast::Sender<()>,
  scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl CollectorService {
  /// Build everything from config, seed venues and start the scheduler.
  #[instrument(skip_all, fields(service = %config.service.name))]
  pub async fn start(config: &AppConfig, shutdown_tx: broadcast::Sender<()>) -> Result<Arc<Self>> {
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics registry")?);

    let venues: Arc<dyn VenueRepository> = Arc::new(
      VenueStore::open(&config.persistence.data_dir)
        .await
        .context("Failed to open venue store")?,
    );
    let prices: Arc<dyn PriceRepository> = Arc::new(
      PriceLog::open(&config.persistence.data_dir)
        .await
        .context("Failed to open price log")?,
    );

    let sources = build_sources(config).await?;
    let router = SourceRouter::new(sources).context("Failed to route price sources")?;

    let service = Arc::new(Self::from_parts(
      venues,
      prices,
      router,
      metrics,
      config.scheduler.max_concurrent_fetches,
      shutdown_tx,
    ));

    let seeded = service.seed(&config.venues).await;
    info!(
      registered = seeded.registered,
      existing = seeded.existing,
      rejected = seeded.rejected,
      "Seed venues processed"
    );
    service.refresh_venue_gauge().await;

    service
      .spawn_scheduler(Schedule {
        interval: Duration::from_secs(config.scheduler.interval_seconds),
        run_on_start: config.scheduler.run_on_start,
      })
      .await;

    Ok(service)
  }

  /// Wire a service from already-built parts (no scheduler yet).
  pub fn from_parts(
    venues: Arc<dyn VenueRepository>,
    prices: Arc<dyn PriceRepository>,
    router: SourceRouter,
    metrics: Arc<MetricsRegistry>,
    max_concurrent_fetches: usize,
    shutdown_tx: broadcast::Sender<()>,
  ) -> Self {
    let orchestrator = Arc::new(Orchestrator::new(
      Arc::clone(&venues),
      Arc::clone(&prices),
      router.clone(),
      max_concurrent_fetches,
    ));

    Self {
      registry: VenueRegistry::new(venues, router),
      orchestrator,
      prices,
      metrics,
      shutdown_tx,
      scheduler: Mutex::new(None),
    }
  }

  /// Register configured venues through the gate.
  ///
  /// Duplicates are expected on restart and only counted; other
  /// rejections are logged and do not stop startup.
  pub async fn seed(&self, seeds: &[VenueSeed]) -> SeedSummary {
    let mut summary = SeedSummary::default();

    for seed in seeds {
      match self.register(candidate_from_seed(seed)).await {
        Ok(_) => summary.registered += 1,
        Err(RegistrationError::DuplicateVenue(_)) => summary.existing += 1,
        Err(e) => {
          warn!(dex = %seed.dex_name, pool = %seed.pool_address, error = %e, "Seed venue rejected");
          summary.rejected += 1;
        }
      }
    }

    summary
  }

  /// Start the periodic trigger. No-op if it is already running.
  pub async fn spawn_scheduler(&self, schedule: Schedule) {
    let mut slot = self.scheduler.lock().await;
    if slot.is_some() {
      return;
    }

    let metrics = Arc::clone(&self.metrics);
    let observer: RunObserver = Arc::new(move |result: &Result<RunOutcome, RunError>| record_run(&metrics, result));

    *slot = Some(scheduler::spawn(
      Arc::clone(&self.orchestrator),
      schedule,
      observer,
      self.shutdown_tx.subscribe(),
    ));
  }

  /// Validation-gated registration.
  pub async fn register(&self, candidate: VenueCandidate) -> Result<Registration, RegistrationError> {
    let result = self.registry.register(candidate).await;

    let label = match &result {
      Ok(_) => "registered",
      Err(RegistrationError::MissingField(_)) => "missing_field",
      Err(RegistrationError::UnknownAdapterKind(_)) => "unknown_adapter_kind",
      Err(RegistrationError::DuplicateVenue(_)) => "duplicate",
      Err(RegistrationError::ValidationFailed { .. }) => "validation_failed",
      Err(RegistrationError::Store(_)) => "store_error",
    };
    self.metrics.registrations.with_label_values(&[label]).inc();

    if result.is_ok() {
      self.refresh_venue_gauge().await;
    }
    result
  }

  /// On-demand run through the same guarded entry point.
  pub async fn trigger_run(&self) -> Result<RunOutcome, RunError> {
    let result = self.orchestrator.run_once().await;
    record_run(&self.metrics, &result);
    result
  }

  pub async fn query_prices(&self, query: &PriceQuery) -> Result<Vec<PriceRecord>, StoreError> {
    self.prices.query(query).await
  }

  pub async fn venues(&self) -> Result<Vec<Venue>, StoreError> {
    self.registry.list().await
  }

  /// Ready when the price store is writable.
  pub async fn is_ready(&self) -> bool {
    self.prices.is_healthy().await
  }

  pub fn metrics(&self) -> &MetricsRegistry {
    &self.metrics
  }

  /// Stop the scheduler and wait for it (an active run finishes first).
  pub async fn shutdown(&self) {
    let _ = self.shutdown_tx.send(());

    if let Some(handle) = self.scheduler.lock().await.take() {
      if let Err(e) = handle.await {
        warn!(error = %e, "Scheduler task ended abnormally");
      }
    }
    info!("Collector service stopped");
  }

  async fn refresh_venue_gauge(&self) {
    if let Ok(count) = self.registry.count().await {
      self
        .metrics
        .venues_registered
        .set(i64::try_from(count).unwrap_or(i64::MAX));
    }
  }
}

/// Construct one source per adapter kind.
async fn build_sources(config: &AppConfig) -> Result<Vec<Arc<dyn PriceSource>>> {
  let driver = WebDriverClient::new(&config.adapters.dom)?;
  let dom = DomRenderSource::new(driver, &config.adapters.dom);

  let rest_client = Arc::new(RestClient::new(&config.adapters.rest)?);
  let rest = RestApiSource::new(rest_client, &config.adapters.rest);

  let providers = Arc::new(
    RpcProviders::connect(&config.adapters.rpc)
      .await
      .context("Failed to configure RPC providers")?,
  );
  let rpc = OnChainRpcSource::new(providers);

  Ok(vec![
    Arc::new(dom) as Arc<dyn PriceSource>,
    Arc::new(rest) as Arc<dyn PriceSource>,
    Arc::new(rpc) as Arc<dyn PriceSource>,
  ])
}

fn candidate_from_seed(seed: &VenueSeed) -> VenueCandidate {
  VenueCandidate {
    dex_name: Some(seed.dex_name.clone()),
    adapter_kind: Some(seed.adapter_kind.clone()),
    network: Some(seed.network.clone()),
    pool_address: Some(seed.pool_address.clone()),
    target_token_address: Some(seed.target_token_address.clone()),
  }
}

/// Update run and fetch metrics from a run result.
fn record_run(metrics: &MetricsRegistry, result: &Result<RunOutcome, RunError>) {
  match result {
    Ok(RunOutcome::Completed(report)) => {
      metrics.runs.with_label_values(&["completed"]).inc();
      metrics.run_duration_seconds.observe(report.duration().as_secs_f64());
      metrics.records_appended.inc_by(report.stored as u64);
      metrics.records_dropped.inc_by(report.dropped as u64);

      for fetch in &report.fetches {
        let adapter = fetch.adapter_kind.as_str();
        metrics.fetches.with_label_values(&[adapter, fetch.result]).inc();
        metrics
          .fetch_latency_seconds
          .with_label_values(&[adapter])
          .observe(Duration::from_millis(fetch.elapsed_ms).as_secs_f64());
      }
    }
    Ok(RunOutcome::Skipped) => metrics.runs.with_label_values(&["skipped"]).inc(),
    Err(RunError::StoreUnavailable { dropped, .. }) => {
      metrics.runs.with_label_values(&["failed"]).inc();
      metrics.records_dropped.inc_by(*dropped as u64);
    }
    Err(RunError::RegistryUnavailable(_)) => metrics.runs.with_label_values(&["failed"]).inc(),
  }
}
