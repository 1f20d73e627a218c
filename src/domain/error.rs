//! Error taxonomy shared by ports, adapters and use cases.
//!
//! Three families, kept apart so callers can tell them apart:
//! adapter-time failures (per venue, recoverable by skipping),
//! registration-time rejections (returned to the caller), and
//! store failures (persistence layer).

use std::time::Duration;

use thiserror::Error;

/// Failure of a single price-source fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Readiness predicate or a bounded call did not complete in time.
    #[error("Extraction timed out after {0:?}")]
    ExtractionTimeout(Duration),

    /// Extracted payload could not be turned into a price.
    #[error("Failed to parse extracted value: {0}")]
    ExtractionParseError(String),

    /// Upstream answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Endpoint unreachable or the pre-call connection check failed.
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    /// Upstream answered but the target is not in the response.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AdapterError {
    /// Stable label for logs and metrics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ExtractionTimeout(_) => "extraction_timeout",
            Self::ExtractionParseError(_) => "extraction_parse_error",
            Self::HttpError { .. } => "http_error",
            Self::ConnectionError(_) => "connection_error",
            Self::NotFound(_) => "not_found",
        }
    }
}

/// Persistence-layer failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store could not be reached or opened.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem read/write failed.
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded.
    #[error("Store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unique `pool_address` constraint violated at insert time.
    #[error("Venue with pool address {0} already exists")]
    DuplicateVenue(String),
}

/// Rejection from the registration gate.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// A required venue field is absent or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The adapter tag does not name a known price source.
    #[error("Unknown adapter kind: {0}")]
    UnknownAdapterKind(String),

    /// Another venue already polls this pool.
    #[error("Venue with pool address {0} already exists")]
    DuplicateVenue(String),

    /// The dry-run fetch failed or produced no quote.
    #[error("Dry-run validation failed: {reason}")]
    ValidationFailed {
        reason: String,
        #[source]
        source: Option<AdapterError>,
    },

    /// Validation passed but the venue could not be persisted.
    #[error("Failed to persist venue: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateVenue(pool) => Self::DuplicateVenue(pool),
            other => Self::Store(other),
        }
    }
}
