//! Venue domain types.
//!
//! A venue is one trading pool/market polled for the target token's
//! price. Venues are immutable once admitted by the registry and carry
//! the tag that selects which price source extracts their quote.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::RegistrationError;

// ────────────────────────────────────────────
// Adapter selection
// ────────────────────────────────────────────

/// Extraction technique used for a venue.
///
/// The set is closed: every variant must have a price source wired
/// at startup (see `SourceRouter`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Headless browser renders the venue page and scrapes a locator.
    Dom,
    /// Pricing service JSON API.
    RestApi,
    /// Direct read of the pool contract over JSON-RPC.
    OnchainRpc,
}

impl AdapterKind {
    /// All variants, in a stable order.
    pub const ALL: [Self; 3] = [Self::Dom, Self::RestApi, Self::OnchainRpc];

    /// Stable tag used in config, persistence and metrics labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dom => "dom",
            Self::RestApi => "rest_api",
            Self::OnchainRpc => "onchain_rpc",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = RegistrationError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "dom" => Ok(Self::Dom),
            "rest_api" => Ok(Self::RestApi),
            "onchain_rpc" => Ok(Self::OnchainRpc),
            other => Err(RegistrationError::UnknownAdapterKind(other.to_string())),
        }
    }
}

// ────────────────────────────────────────────
// Venue
// ────────────────────────────────────────────

/// A registered venue. Only the registry constructs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Registry-assigned identifier.
    pub id: Uuid,
    /// Human-readable venue name; also the `dex_name` of its records.
    pub dex_name: String,
    /// Which price source extracts this venue's quote.
    pub adapter_kind: AdapterKind,
    /// Network identifier (e.g. `hyperevm`, `hyperliquid`).
    pub network: String,
    /// Pool / market address. Unique across the registry.
    pub pool_address: String,
    /// Address of the token whose price is collected.
    pub target_token_address: String,
    /// When the venue passed validation.
    pub created_at: DateTime<Utc>,
}

impl Venue {
    /// Whether this venue polls the given pool (addresses compare case-insensitively).
    pub fn has_pool(&self, pool_address: &str) -> bool {
        self.pool_address.eq_ignore_ascii_case(pool_address.trim())
    }
}

/// Unvalidated registration request.
///
/// Every field is optional so that absent input surfaces as
/// `RegistrationError::MissingField` rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueCandidate {
    pub dex_name: Option<String>,
    pub adapter_kind: Option<String>,
    pub network: Option<String>,
    pub pool_address: Option<String>,
    pub target_token_address: Option<String>,
}

impl VenueCandidate {
    /// Check required fields and resolve the adapter tag.
    ///
    /// Produces a `Venue` with a fresh id; nothing is persisted here.
    pub fn into_venue(self) -> Result<Venue, RegistrationError> {
        let dex_name = required("dex_name", self.dex_name)?;
        let adapter_tag = required("adapter_kind", self.adapter_kind)?;
        let network = required("network", self.network)?;
        let pool_address = required("pool_address", self.pool_address)?;
        let target_token_address =
            required("target_token_address", self.target_token_address)?;

        let adapter_kind = adapter_tag.parse::<AdapterKind>()?;

        Ok(Venue {
            id: Uuid::new_v4(),
            dex_name,
            adapter_kind,
            network,
            pool_address,
            target_token_address,
            created_at: Utc::now(),
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, RegistrationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(RegistrationError::MissingField(field)),
    }
}
