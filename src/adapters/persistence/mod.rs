//! Persistence Adapters - File-based Storage
//!
//! Implements the repository ports using append-only JSONL files for
//! the price time series and an atomic JSON snapshot for the venue
//! registry. No database dependency.

pub mod prices;
pub mod venues;

pub use prices::PriceLog;
pub use venues::VenueStore;
