//! On-chain Pool Reader - Price Source over JSON-RPC
//!
//! Implements `PriceSource` for `onchain_rpc` venues. Reads a
//! concentrated-liquidity pool directly: `slot0()` for the packed
//! square-root price, `token0()`/`token1()` to place the target token,
//! `decimals()` on both tokens for scaling. `fee()` and `symbol()` are
//! read best-effort for the fee tier and pair label.

use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::pool_math::{
    TargetSide, decode_address, decode_fee, decode_string, decode_u8, decode_word,
    fee_tier_percentage, sqrt_price_x96_to_price,
};
use super::provider::{NetworkProvider, RpcProviders};
use crate::domain::{AdapterError, AdapterKind, PriceQuote, Venue};
use crate::ports::PriceSource;

/// Price source reading pool contracts over JSON-RPC.
pub struct OnChainRpcSource {
    providers: Arc<RpcProviders>,
}

impl OnChainRpcSource {
    pub fn new(providers: Arc<RpcProviders>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl PriceSource for OnChainRpcSource {
    fn kind(&self) -> AdapterKind {
        AdapterKind::OnchainRpc
    }

    #[instrument(skip(self, venue), fields(dex = %venue.dex_name, network = %venue.network, pool = %venue.pool_address))]
    async fn fetch(&self, venue: &Venue) -> Result<Option<PriceQuote>, AdapterError> {
        let provider = self.providers.get(&venue.network)?;
        let pool = parse_address(&venue.pool_address, "pool_address")?;
        let target = parse_address(&venue.target_token_address, "target_token_address")?;

        provider.check_connection().await?;

        let slot0 = provider.call_view(pool, "slot0()").await?;
        let sqrt_price_x96 = decode_word(&slot0)
            .ok_or_else(|| AdapterError::ExtractionParseError("slot0() returned no data".to_string()))?;

        let token0 = read_address(provider, pool, "token0()").await?;
        let token1 = read_address(provider, pool, "token1()").await?;

        let (side, other) = if token0 == target {
            (TargetSide::Token0, token1)
        } else if token1 == target {
            (TargetSide::Token1, token0)
        } else {
            return Err(AdapterError::NotFound(format!(
                "target token {target} is neither token0 {token0} nor token1 {token1}"
            )));
        };

        let decimals0 = read_decimals(provider, token0).await?;
        let decimals1 = read_decimals(provider, token1).await?;

        let price = sqrt_price_x96_to_price(sqrt_price_x96, decimals0, decimals1, side).ok_or_else(|| {
            AdapterError::ExtractionParseError(format!("sqrtPriceX96 {sqrt_price_x96} has no representable price"))
        })?;

        let fee = match provider.call_view(pool, "fee()").await {
            Ok(data) => decode_fee(&data).map(fee_tier_percentage),
            Err(e) => {
                debug!(error = %e, "Pool fee tier unavailable");
                None
            }
        };

        let label = pair_label(provider, target, other, fee).await;

        debug!(
            price = %price,
            decimals0,
            decimals1,
            target_is_token0 = side == TargetSide::Token0,
            "On-chain quote computed"
        );

        let mut quote = PriceQuote::new(price, label);
        if let Some(fee) = fee {
            quote = quote.with_fee(fee);
        }
        Ok(Some(quote))
    }
}

fn parse_address(raw: &str, field: &str) -> Result<Address, AdapterError> {
    raw.trim()
        .parse()
        .map_err(|e| AdapterError::ExtractionParseError(format!("invalid {field} {raw}: {e}")))
}

async fn read_address(provider: &NetworkProvider, pool: Address, signature: &str) -> Result<Address, AdapterError> {
    let data = provider.call_view(pool, signature).await?;
    decode_address(&data)
        .ok_or_else(|| AdapterError::ExtractionParseError(format!("{signature} returned no address")))
}

async fn read_decimals(provider: &NetworkProvider, token: Address) -> Result<u8, AdapterError> {
    let data = provider.call_view(token, "decimals()").await?;
    decode_u8(&data)
        .ok_or_else(|| AdapterError::ExtractionParseError(format!("decimals() of {token} is not a uint8")))
}

/// `TARGET / OTHER 0.3%`, or `Unknown Pair` when symbols are unreadable.
async fn pair_label(
    provider: &NetworkProvider,
    target: Address,
    other: Address,
    fee: Option<rust_decimal::Decimal>,
) -> String {
    let target_symbol = read_symbol(provider, target).await;
    let other_symbol = read_symbol(provider, other).await;

    match (target_symbol, other_symbol) {
        (Some(t), Some(o)) => match fee {
            Some(fee) => format!("{t} / {o} {fee}%"),
            None => format!("{t} / {o}"),
        },
        _ => "Unknown Pair".to_string(),
    }
}

async fn read_symbol(provider: &NetworkProvider, token: Address) -> Option<String> {
    let data = provider.call_view(token, "symbol()").await.ok()?;
    decode_string(&data)
}
