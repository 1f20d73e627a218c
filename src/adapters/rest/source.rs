//! REST Price Source - Pool Prices from a Pricing Service
//!
//! Most venues are priced through the GeckoTerminal pool endpoint,
//! which reports a USD price for both sides of the pool; the side whose
//! address matches the venue's target token is taken. Venues on the
//! `hyperliquid` network are spot tokens without an EVM pool and are
//! priced through the Hyperliquid info API instead.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::client::RestClient;
use super::types::{PoolResponse, TokenDetails, TokenDetailsRequest, json_decimal};
use crate::config::RestConfig;
use crate::domain::{AdapterError, AdapterKind, PriceQuote, Venue};
use crate::ports::PriceSource;

/// Network served by the Hyperliquid info API.
const HYPERLIQUID_NETWORK: &str = "hyperliquid";

/// Price source backed by a REST pricing service.
pub struct RestApiSource {
    client: Arc<RestClient>,
    geckoterminal_base_url: String,
    hyperliquid_info_url: String,
}

impl RestApiSource {
    /// Create a new REST source sharing the given client.
    pub fn new(client: Arc<RestClient>, config: &RestConfig) -> Self {
        Self {
            client,
            geckoterminal_base_url: config.geckoterminal_base_url.trim_end_matches('/').to_string(),
            hyperliquid_info_url: config.hyperliquid_info_url.clone(),
        }
    }

    /// Pool endpoint URL for a venue.
    pub fn pool_url(&self, venue: &Venue) -> String {
        format!(
            "{}/networks/{}/pools/{}",
            self.geckoterminal_base_url, venue.network, venue.pool_address
        )
    }

    async fn fetch_pool(&self, venue: &Venue) -> Result<PriceQuote, AdapterError> {
        let pool: PoolResponse = self.client.get_json(&self.pool_url(venue)).await?;
        select_target_price(&pool, &venue.target_token_address)
    }

    async fn fetch_native(&self, venue: &Venue) -> Result<PriceQuote, AdapterError> {
        let request = TokenDetailsRequest::new(&venue.target_token_address);
        let details: TokenDetails = self
            .client
            .post_json(&self.hyperliquid_info_url, &request)
            .await?;
        native_quote(&details, &venue.target_token_address)
    }
}

#[async_trait]
impl PriceSource for RestApiSource {
    fn kind(&self) -> AdapterKind {
        AdapterKind::RestApi
    }

    #[instrument(skip(self, venue), fields(dex = %venue.dex_name, network = %venue.network))]
    async fn fetch(&self, venue: &Venue) -> Result<Option<PriceQuote>, AdapterError> {
        let quote = if venue.network.eq_ignore_ascii_case(HYPERLIQUID_NETWORK) {
            self.fetch_native(venue).await?
        } else {
            self.fetch_pool(venue).await?
        };

        debug!(spot = %quote.spot_price, pair = %quote.pair_label, "REST quote extracted");
        Ok(Some(quote))
    }
}

/// Pick the target token's side of a pool response.
///
/// Addresses compare case-insensitively. Fails `NotFound` when the
/// target is neither the base nor the quote token.
pub fn select_target_price(pool: &PoolResponse, target: &str) -> Result<PriceQuote, AdapterError> {
    let target = target.trim();
    let attributes = &pool.data.attributes;
    let relationships = &pool.data.relationships;

    let (side, raw_price) = if relationships.base_token.data.address().eq_ignore_ascii_case(target) {
        ("base", attributes.base_token_price_usd.as_ref())
    } else if relationships.quote_token.data.address().eq_ignore_ascii_case(target) {
        ("quote", attributes.quote_token_price_usd.as_ref())
    } else {
        return Err(AdapterError::NotFound(format!(
            "target token {target} is neither base nor quote of the pool"
        )));
    };

    let price = raw_price
        .and_then(json_decimal)
        .ok_or_else(|| AdapterError::ExtractionParseError(format!("{side} token price missing or not numeric")))?;
    let price = non_negative(price)?;

    let label = attributes
        .name
        .clone()
        .unwrap_or_else(|| "Unknown Pair".to_string());

    Ok(PriceQuote::new(price, label))
}

/// Quote from a Hyperliquid `tokenDetails` response.
pub fn native_quote(details: &TokenDetails, target: &str) -> Result<PriceQuote, AdapterError> {
    let raw = details
        .mid_px
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or_else(|| AdapterError::NotFound(format!("no midPx for token {target}")))?;

    let price = json_decimal(raw)
        .ok_or_else(|| AdapterError::ExtractionParseError(format!("midPx not numeric: {raw}")))?;
    let price = non_negative(price)?;

    let symbol = details.name.as_deref().unwrap_or(target);
    Ok(PriceQuote::new(price, format!("{symbol} / USDC (Native)")).with_fee(Decimal::ZERO))
}

fn non_negative(price: Decimal) -> Result<Decimal, AdapterError> {
    if price.is_sign_negative() {
        return Err(AdapterError::ExtractionParseError(format!("negative price {price}")));
    }
    Ok(price.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pool_fixture() -> PoolResponse {
        serde_json::from_value(serde_json::json!({
            "data": {
                "attributes": {
                    "name": "AA / BB",
                    "base_token_price_usd": "10.5",
                    "quote_token_price_usd": "0.25"
                },
                "relationships": {
                    "base_token": {"data": {"id": "hyperevm_0xAA"}},
                    "quote_token": {"data": {"id": "hyperevm_0xBB"}}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_base_side_matches_case_insensitively() {
        let quote = select_target_price(&pool_fixture(), "0xaa").unwrap();
        assert_eq!(quote.spot_price, dec!(10.5));
        assert_eq!(quote.buy_price, dec!(10.5));
        assert_eq!(quote.pair_label, "AA / BB");
    }

    #[test]
    fn test_quote_side_selected() {
        let quote = select_target_price(&pool_fixture(), "0xBB").unwrap();
        assert_eq!(quote.spot_price, dec!(0.25));
    }

    #[test]
    fn test_unknown_target_is_not_found() {
        let err = select_target_price(&pool_fixture(), "0xCC").unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(_)));
    }

    #[test]
    fn test_missing_side_price_is_parse_error() {
        let mut pool = pool_fixture();
        pool.data.attributes.base_token_price_usd = None;
        let err = select_target_price(&pool, "0xAA").unwrap_err();
        assert!(matches!(err, AdapterError::ExtractionParseError(_)));
    }

    #[test]
    fn test_native_quote_uses_mid_price() {
        let details: TokenDetails = serde_json::from_value(serde_json::json!({
            "name": "HYPE",
            "midPx": "41.2035",
            "markPx": "41.21"
        }))
        .unwrap();
        let quote = native_quote(&details, "0x0d01").unwrap();
        assert_eq!(quote.spot_price, dec!(41.2035));
        assert_eq!(quote.fee_percentage, Some(Decimal::ZERO));
        assert_eq!(quote.pair_label, "HYPE / USDC (Native)");
    }

    #[test]
    fn test_native_quote_without_mid_is_not_found() {
        let details: TokenDetails =
            serde_json::from_value(serde_json::json!({"name": "HYPE", "midPx": null})).unwrap();
        assert!(matches!(
            native_quote(&details, "0x0d01"),
            Err(AdapterError::NotFound(_))
        ));
    }
}
