//! Metrics Adapter
//!
//! Prometheus registry for the collector; exposed over HTTP by the
//! `/metrics` route.

pub mod prometheus;

pub use self::prometheus::MetricsRegistry;
