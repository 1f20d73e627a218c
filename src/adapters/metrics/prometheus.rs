//! Prometheus Metrics Registry - Collector Observability
//!
//! Registers the collector's Prometheus metrics and renders them in
//! the text exposition format for the `/metrics` route. Covers run
//! outcomes, per-adapter fetch results and latency, stored records,
//! and registrations.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Centralized Prometheus metrics for the collector.
///
/// All metrics follow the naming convention `dex_collector_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Orchestration runs by outcome (completed, skipped, failed).
    pub runs: IntCounterVec,
    /// Wall time of completed runs (seconds).
    pub run_duration_seconds: Histogram,
    /// Venue fetches by adapter and result (`ok` or error kind).
    pub fetches: IntCounterVec,
    /// Venue fetch latency by adapter (seconds).
    pub fetch_latency_seconds: HistogramVec,
    /// Price records appended.
    pub records_appended: IntCounter,
    /// Price records dropped because the append failed.
    pub records_dropped: IntCounter,
    /// Registration attempts by result.
    pub registrations: IntCounterVec,
    /// Currently registered venues.
    pub venues_registered: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let runs = IntCounterVec::new(
            Opts::new("dex_collector_runs_total", "Orchestration runs by outcome"),
            &["outcome"],
        )?;

        let run_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "dex_collector_run_duration_seconds",
                "Wall time of a completed orchestration run",
            )
            .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0]),
        )?;

        let fetches = IntCounterVec::new(
            Opts::new("dex_collector_fetches_total", "Venue fetches by adapter and result"),
            &["adapter", "result"],
        )?;

        let fetch_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dex_collector_fetch_latency_seconds",
                "Venue fetch latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["adapter"],
        )?;

        let records_appended = IntCounter::new(
            "dex_collector_records_appended_total",
            "Price records appended to the time series",
        )?;

        let records_dropped = IntCounter::new(
            "dex_collector_records_dropped_total",
            "Price records dropped after a failed append",
        )?;

        let registrations = IntCounterVec::new(
            Opts::new("dex_collector_registrations_total", "Venue registrations by result"),
            &["result"],
        )?;

        let venues_registered = IntGauge::new(
            "dex_collector_venues_registered",
            "Number of registered venues",
        )?;

        // Register all metrics
        registry.register(Box::new(runs.clone()))?;
        registry.register(Box::new(run_duration_seconds.clone()))?;
        registry.register(Box::new(fetches.clone()))?;
        registry.register(Box::new(fetch_latency_seconds.clone()))?;
        registry.register(Box::new(records_appended.clone()))?;
        registry.register(Box::new(records_dropped.clone()))?;
        registry.register(Box::new(registrations.clone()))?;
        registry.register(Box::new(venues_registered.clone()))?;

        Ok(Self {
            registry,
            runs,
            run_duration_seconds,
            fetches,
            fetch_latency_seconds,
            records_appended,
            records_dropped,
            registrations,
            venues_registered,
        })
    }

    /// Render every metric family in the text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
