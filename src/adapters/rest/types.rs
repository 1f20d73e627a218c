//! Pricing API Response Types
//!
//! Serialization types for the GeckoTerminal pool endpoint and the
//! Hyperliquid `tokenDetails` info request. Only the fields the
//! collector reads are modelled.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /networks/{network}/pools/{pool}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolResponse {
    pub data: PoolData,
}

/// Pool resource.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolData {
    pub attributes: PoolAttributes,
    pub relationships: PoolRelationships,
}

/// Pool attributes (prices arrive as decimal strings).
#[derive(Debug, Clone, Deserialize)]
pub struct PoolAttributes {
    /// Pool display name, e.g. `WHYPE / USD₮0 0.05%`.
    pub name: Option<String>,
    pub base_token_price_usd: Option<Value>,
    pub quote_token_price_usd: Option<Value>,
}

/// Token relationships of a pool.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolRelationships {
    pub base_token: Relationship,
    pub quote_token: Relationship,
}

/// JSON:API relationship wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    pub data: RelationshipData,
}

/// Related resource identifier, shaped `<network>_<address>`.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipData {
    pub id: String,
}

impl RelationshipData {
    /// Token address: the segment after the last underscore.
    pub fn address(&self) -> &str {
        self.id.rsplit('_').next().unwrap_or(&self.id)
    }
}

/// Hyperliquid info request body.
#[derive(Debug, Clone, Serialize)]
pub struct TokenDetailsRequest<'a> {
    #[serde(rename = "type")]
    pub request_type: &'static str,
    #[serde(rename = "tokenId")]
    pub token_id: &'a str,
}

impl<'a> TokenDetailsRequest<'a> {
    pub fn new(token_id: &'a str) -> Self {
        Self {
            request_type: "tokenDetails",
            token_id,
        }
    }
}

/// Hyperliquid `tokenDetails` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenDetails {
    pub name: Option<String>,
    /// Mid price; best proxy for spot.
    #[serde(rename = "midPx")]
    pub mid_px: Option<Value>,
}

/// Decimal from a JSON string or number.
pub fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .ok(),
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        _ => None,
    }
}
