//! Price Repository Port - Append-only Time Series
//!
//! Records are inserted one at a time and never mutated. Reads return
//! records newest first.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{PriceRecord, StoreError};

/// Filters for a price query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PriceQuery {
  /// Exact venue name match.
  pub dex_name: Option<String>,
  /// Maximum number of records returned.
  pub limit: Option<usize>,
}

impl PriceQuery {
  /// Most recent record, optionally for one venue.
  pub fn latest(dex_name: Option<String>) -> Self {
    Self {
      dex_name,
      limit: Some(1),
    }
  }
}

/// Trait for price persistence providers.
#[async_trait]
pub trait PriceRepository: Send + Sync + 'static {
  /// Append one record. Each append is independently atomic.
  async fn append(&self, record: &PriceRecord) -> Result<(), StoreError>;

  /// Records matching the query, ordered by `captured_at` descending.
  async fn query(&self, query: &PriceQuery) -> Result<Vec<PriceRecord>, StoreError>;

  /// Check if the store is writable.
  async fn is_healthy(&self) -> bool;
}
