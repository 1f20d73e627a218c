//! Scheduler - Periodic Run Trigger
//!
//! Fires `Orchestrator::run_once` on a fixed interval until shutdown.
//! Ticks missed while a slow run is active are skipped rather than
//! replayed in a burst; a tick that still lands on an active run (an
//! on-demand trigger got there first) is dropped by the run guard.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::orchestrator::{Orchestrator, RunError, RunOutcome};

/// Callback invoked with every run result.
pub type RunObserver = Arc<dyn Fn(&Result<RunOutcome, RunError>) + Send + Sync>;

/// Periodic trigger settings.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
  pub interval: Duration,
  /// Fire immediately instead of after the first interval.
  pub run_on_start: bool,
}

/// Spawn the periodic trigger task.
pub fn spawn(
  orchestrator: Arc<Orchestrator>,
  schedule: Schedule,
  observer: RunObserver,
  mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    if !schedule.run_on_start {
      // First tick completes immediately.
      ticker.tick().await;
    }

    info!(
      interval_s = schedule.interval.as_secs(),
      run_on_start = schedule.run_on_start,
      "Scheduler started"
    );

    loop {
      tokio::select! {
        _ = shutdown_rx.recv() => {
          info!("Scheduler received shutdown signal");
          break;
        }
        _ = ticker.tick() => {
          let result = orchestrator.run_once().await;
          if let Err(e) = &result {
            error!(error = %e, "Scheduled run failed");
          }
          observer(&result);
        }
      }
    }
  })
}
