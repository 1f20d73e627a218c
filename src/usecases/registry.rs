//! Venue Registry Use Case - Validation-gated Registration
//!
//! A venue is admitted only after a live dry-run fetch succeeds.
//!
//! Registration flow:
//! 1. Check required fields and resolve the adapter tag
//! 2. Reject a pool address that is already registered
//! 3. Run exactly one dry-run fetch through the routed source
//! 4. Persist the venue and hand back the dry-run quote
//!
//! Any rejection leaves the registry untouched.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::sources::SourceRouter;
use crate::domain::{PriceQuote, RegistrationError, StoreError, Venue, VenueCandidate};
use crate::ports::VenueRepository;

/// A venue admitted by the gate, with its dry-run quote.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Registration {
  pub venue: Venue,
  /// The dry-run quote, unchanged.
  pub quote: PriceQuote,
}

/// Registration gate in front of the venue repository.
pub struct VenueRegistry {
  venues: Arc<dyn VenueRepository>,
  sources: SourceRouter,
}

impl VenueRegistry {
  pub fn new(venues: Arc<dyn VenueRepository>, sources: SourceRouter) -> Self {
    Self { venues, sources }
  }

  /// Validate and admit a candidate venue.
  ///
  /// # Errors
  /// - `MissingField` / `UnknownAdapterKind` for malformed input
  /// - `DuplicateVenue` if the pool is already registered
  /// - `ValidationFailed` if the dry-run fetch errors or yields nothing
  /// - `Store` if the venue could not be persisted
  #[instrument(skip(self, candidate), fields(dex = ?candidate.dex_name, pool = ?candidate.pool_address))]
  pub async fn register(&self, candidate: VenueCandidate) -> Result<Registration, RegistrationError> {
    let venue = candidate.into_venue()?;

    if self
      .venues
      .contains_pool(&venue.pool_address)
      .await
      .map_err(RegistrationError::Store)?
    {
      info!(pool = %venue.pool_address, "Registration rejected: duplicate pool");
      return Err(RegistrationError::DuplicateVenue(venue.pool_address));
    }

    let source = self.sources.source(venue.adapter_kind);
    let quote = match source.fetch(&venue).await {
      Ok(Some(quote)) if quote.is_valid() => quote,
      Ok(Some(quote)) => {
        return Err(RegistrationError::ValidationFailed {
          reason: format!("dry-run returned invalid price {}", quote.spot_price),
          source: None,
        });
      }
      Ok(None) => {
        return Err(RegistrationError::ValidationFailed {
          reason: "dry-run returned no quote".to_string(),
          source: None,
        });
      }
      Err(e) => {
        warn!(
          dex = %venue.dex_name,
          adapter = %venue.adapter_kind,
          error_kind = e.kind(),
          error = %e,
          "Dry-run fetch failed"
        );
        return Err(RegistrationError::ValidationFailed {
          reason: e.to_string(),
          source: Some(e),
        });
      }
    };

    self.venues.insert(&venue).await?;

    info!(
      venue_id = %venue.id,
      dex = %venue.dex_name,
      adapter = %venue.adapter_kind,
      spot = %quote.spot_price,
      "Venue registered"
    );

    Ok(Registration { venue, quote })
  }

  /// Every registered venue.
  pub async fn list(&self) -> Result<Vec<Venue>, StoreError> {
    self.venues.list().await
  }

  /// Number of registered venues.
  pub async fn count(&self) -> Result<usize, StoreError> {
    self.venues.count().await
  }
}
