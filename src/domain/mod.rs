//! Domain layer - Core collector models.
//!
//! Venues, quotes, records, the error taxonomy and price-text
//! normalization. No I/O here (hexagonal architecture inner ring).

pub mod error;
pub mod pricing;
pub mod quote;
pub mod venue;

// Re-export core types for convenience
pub use error::{AdapterError, RegistrationError, StoreError};
pub use quote::{PriceQuote, PriceRecord};
pub use venue::{AdapterKind, Venue, VenueCandidate};
