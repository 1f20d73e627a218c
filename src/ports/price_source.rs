//! Price Source Port - Venue Quote Extraction Interface
//!
//! One implementation per `AdapterKind`. Each fetch is self-contained:
//! it acquires whatever resources it needs (browser session, HTTP
//! request, RPC calls), enforces its own deadline and releases the
//! resources before returning.

use async_trait::async_trait;

use crate::domain::{AdapterError, AdapterKind, PriceQuote, Venue};

/// Trait for price extraction adapters.
///
/// Implementations must be safe to call concurrently for different
/// venues: no mutable state may be shared between two in-flight
/// fetches.
#[async_trait]
pub trait PriceSource: Send + Sync + 'static {
  /// The adapter kind this source serves.
  fn kind(&self) -> AdapterKind;

  /// Fetch one normalized quote for the venue.
  ///
  /// `Ok(None)` means the venue answered but produced no usable
  /// quote; callers treat it like a failure.
  async fn fetch(&self, venue: &Venue) -> Result<Option<PriceQuote>, AdapterError>;
}
