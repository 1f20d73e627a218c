//! Venue Repository Port - Durable Venue Configuration
//!
//! Venues are only ever inserted (never updated or deleted here).
//! `pool_address` is unique; implementations enforce it at insert
//! time as well, so concurrent registrations cannot both win.

use async_trait::async_trait;

use crate::domain::{StoreError, Venue};

/// Trait for venue persistence providers.
#[async_trait]
pub trait VenueRepository: Send + Sync + 'static {
  /// Load every registered venue.
  async fn list(&self) -> Result<Vec<Venue>, StoreError>;

  /// Whether a venue already polls this pool (case-insensitive).
  async fn contains_pool(&self, pool_address: &str) -> Result<bool, StoreError>;

  /// Persist a new venue. Fails with `StoreError::DuplicateVenue`
  /// if the pool is already present.
  async fn insert(&self, venue: &Venue) -> Result<(), StoreError>;

  /// Number of registered venues.
  async fn count(&self) -> Result<usize, StoreError>;
}
