//! Orchestrator Use Case - One Collection Run
//!
//! A run loads every registered venue, fetches a quote for each
//! through its routed price source, stamps successful quotes and
//! appends them to the price store.
//!
//! Run flow:
//! 1. Take the run guard (a concurrent trigger is dropped, not queued)
//! 2. Load venues from the registry
//! 3. Fan out fetches with a bounded number in flight
//! 4. Append each quote as it arrives; failures become skips
//! 5. Return a report
//!
//! Per-venue failures never fail the run. Only an unreadable registry
//! or a store that rejected every append does.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::sources::SourceRouter;
use crate::domain::{AdapterError, AdapterKind, PriceQuote, PriceRecord, StoreError, Venue};
use crate::ports::{PriceRepository, VenueRepository};

/// Run-level failure.
#[derive(Error, Debug)]
pub enum RunError {
  /// Venues could not be loaded; nothing was fetched.
  #[error("Venue registry unavailable: {0}")]
  RegistryUnavailable(#[source] StoreError),

  /// Every attempted append failed.
  #[error("Price store unavailable, {dropped} records dropped: {source}")]
  StoreUnavailable {
    dropped: usize,
    #[source]
    source: StoreError,
  },
}

/// A venue that produced no record in a run.
#[derive(Debug, Clone, Serialize)]
pub struct VenueSkip {
  pub venue_id: Uuid,
  pub dex_name: String,
  pub pool_address: String,
  pub adapter_kind: AdapterKind,
  /// Error kind label (`extraction_timeout`, `empty_quote`, ...).
  pub kind: &'static str,
  pub message: String,
}

/// Timing of one venue fetch.
#[derive(Debug, Clone, Serialize)]
pub struct FetchTiming {
  pub adapter_kind: AdapterKind,
  /// `ok` or the skip kind.
  pub result: &'static str,
  pub elapsed_ms: u64,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub run_id: Uuid,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  /// Venues attempted.
  pub venues: usize,
  /// Records appended.
  pub stored: usize,
  /// Records whose append failed.
  pub dropped: usize,
  pub skips: Vec<VenueSkip>,
  pub fetches: Vec<FetchTiming>,
}

impl RunReport {
  /// Run wall time.
  pub fn duration(&self) -> Duration {
    (self.finished_at - self.started_at).to_std().unwrap_or_default()
  }
}

/// Result of a trigger.
#[derive(Debug, Clone)]
pub enum RunOutcome {
  Completed(RunReport),
  /// Another run was active; this trigger did nothing.
  Skipped,
}

/// Per-venue result before persistence.
enum FetchResult {
  Quote(PriceQuote),
  Skip(&'static str, String),
}

/// Single entry point shared by the periodic and on-demand triggers.
pub struct Orchestrator {
  venues: Arc<dyn VenueRepository>,
  prices: Arc<dyn PriceRepository>,
  sources: SourceRouter,
  max_concurrent_fetches: usize,
  /// Held for the duration of a run.
  run_guard: Mutex<()>,
}

impl Orchestrator {
  pub fn new(
    venues: Arc<dyn VenueRepository>,
    prices: Arc<dyn PriceRepository>,
    sources: SourceRouter,
    max_concurrent_fetches: usize,
  ) -> Self {
    Self {
      venues,
      prices,
      sources,
      max_concurrent_fetches: max_concurrent_fetches.max(1),
      run_guard: Mutex::new(()),
    }
  }

  /// Whether a run is in progress.
  pub fn is_running(&self) -> bool {
    self.run_guard.try_lock().is_err()
  }

  /// Execute one run, or return `Skipped` if one is already active.
  ///
  /// # Errors
  /// `RegistryUnavailable` if venues cannot be loaded,
  /// `StoreUnavailable` if every append failed.
  #[instrument(skip(self))]
  pub async fn run_once(&self) -> Result<RunOutcome, RunError> {
    let Ok(_guard) = self.run_guard.try_lock() else {
      info!("Run already active, trigger dropped");
      return Ok(RunOutcome::Skipped);
    };

    let run_id = Uuid::new_v4();
    let started_at = Utc::now();

    let venues = self.venues.list().await.map_err(|e| {
      error!(error = %e, "Failed to load venues");
      RunError::RegistryUnavailable(e)
    })?;

    info!(run_id = %run_id, venues = venues.len(), "Run started");

    let mut stored = 0;
    let mut dropped = 0;
    let mut last_store_error = None;
    let mut skips = Vec::new();
    let mut fetches = Vec::with_capacity(venues.len());

    // Collected first: a borrowing map closure makes the run future non-Send.
    let pending: Vec<_> = venues.iter().map(|venue| self.fetch_one(venue)).collect();
    let mut results = stream::iter(pending).buffer_unordered(self.max_concurrent_fetches);

    while let Some((venue, result, elapsed)) = results.next().await {
      let label = match result {
        FetchResult::Quote(quote) => {
          let record = PriceRecord::from_quote(venue, quote, Utc::now());
          match self.prices.append(&record).await {
            Ok(()) => stored += 1,
            Err(e) => {
              warn!(
                dex = %venue.dex_name,
                error = %e,
                "Failed to append price record, dropped"
              );
              dropped += 1;
              last_store_error = Some(e);
            }
          }
          "ok"
        }
        FetchResult::Skip(kind, message) => {
          warn!(
            venue_id = %venue.id,
            dex = %venue.dex_name,
            pool = %venue.pool_address,
            adapter = %venue.adapter_kind,
            error_kind = kind,
            error = %message,
            "Venue skipped"
          );
          skips.push(VenueSkip {
            venue_id: venue.id,
            dex_name: venue.dex_name.clone(),
            pool_address: venue.pool_address.clone(),
            adapter_kind: venue.adapter_kind,
            kind,
            message,
          });
          kind
        }
      };

      fetches.push(FetchTiming {
        adapter_kind: venue.adapter_kind,
        result: label,
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
      });
    }

    if stored == 0 {
      if let Some(source) = last_store_error {
        error!(dropped, error = %source, "Every append failed");
        return Err(RunError::StoreUnavailable { dropped, source });
      }
    }

    let report = RunReport {
      run_id,
      started_at,
      finished_at: Utc::now(),
      venues: venues.len(),
      stored,
      dropped,
      skips,
      fetches,
    };

    info!(
      run_id = %run_id,
      venues = report.venues,
      stored = report.stored,
      skipped = report.skips.len(),
      dropped = report.dropped,
      duration_ms = report.duration().as_millis() as u64,
      "Run complete"
    );

    Ok(RunOutcome::Completed(report))
  }

  async fn fetch_one<'a>(&self, venue: &'a Venue) -> (&'a Venue, FetchResult, Duration) {
    let start = Instant::now();
    let source = self.sources.source(venue.adapter_kind);
    let result = classify(source.fetch(venue).await);
    debug!(dex = %venue.dex_name, elapsed_ms = start.elapsed().as_millis() as u64, "Fetch finished");
    (venue, result, start.elapsed())
  }
}

/// Exhaustive mapping of a fetch result to a quote or a skip.
fn classify(result: Result<Option<PriceQuote>, AdapterError>) -> FetchResult {
  match result {
    Ok(Some(quote)) if quote.is_valid() => FetchResult::Quote(quote),
    Ok(Some(quote)) => FetchResult::Skip("invalid_quote", format!("negative price {}", quote.spot_price)),
    Ok(None) => FetchResult::Skip("empty_quote", "source returned no quote".to_string()),
    Err(e @ AdapterError::ExtractionTimeout(_))
    | Err(e @ AdapterError::ExtractionParseError(_))
    | Err(e @ AdapterError::HttpError { .. })
    | Err(e @ AdapterError::ConnectionError(_))
    | Err(e @ AdapterError::NotFound(_)) => FetchResult::Skip(e.kind(), e.to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_classify_maps_every_error_kind() {
    let err = classify(Err(AdapterError::NotFound("0xcc".into())));
    assert!(matches!(err, FetchResult::Skip("not_found", _)));

    let empty = classify(Ok(None));
    assert!(matches!(empty, FetchResult::Skip("empty_quote", _)));

    let ok = classify(Ok(Some(PriceQuote::new(dec!(1.5), "A / B"))));
    assert!(matches!(ok, FetchResult::Quote(q) if q.spot_price == dec!(1.5)));

    let negative = classify(Ok(Some(PriceQuote::new(dec!(-1), "A / B"))));
    assert!(matches!(negative, FetchResult::Skip("invalid_quote", _)));
  }
}
