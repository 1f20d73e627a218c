//! REST Pricing Adapter
//!
//! Sub-modules:
//! - `client`: HTTP client with timeout and rate limiting
//! - `source`: `PriceSource` implementation (GeckoTerminal, Hyperliquid)
//! - `types`: API response type definitions

pub mod client;
pub mod source;
pub mod types;

pub use client::RestClient;
pub use source::RestApiSource;
