//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PriceSource`: One extraction technique producing a quote per venue
//! - `VenueRepository`: Durable venue configuration (unique pool address)
//! - `PriceRepository`: Append-only price time series

pub mod price_repository;
pub mod price_source;
pub mod venue_repository;

pub use price_repository::{PriceQuery, PriceRepository};
pub use price_source::PriceSource;
pub use venue_repository::VenueRepository;
