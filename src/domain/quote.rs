//! Price quote and persisted price record.
//!
//! `PriceQuote` is what a price source returns for one venue;
//! `PriceRecord` is the timestamped row appended to the time series.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::venue::Venue;

/// Normalized quote produced by a price source.
///
/// `buy_price` and `sell_price` are always populated: when a source
/// does not supply them they equal `spot_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Spot price of the target token, never negative.
    pub spot_price: Decimal,
    /// Venue fee in percent, when the source knows it.
    pub fee_percentage: Option<Decimal>,
    /// Effective buy price.
    pub buy_price: Decimal,
    /// Effective sell price.
    pub sell_price: Decimal,
    /// Pair label as reported by the venue (e.g. `WHYPE / USD₮0 0.05%`).
    pub pair_label: String,
}

impl PriceQuote {
    /// Quote with buy/sell defaulting to spot.
    pub fn new(spot_price: Decimal, pair_label: impl Into<String>) -> Self {
        Self {
            spot_price,
            fee_percentage: None,
            buy_price: spot_price,
            sell_price: spot_price,
            pair_label: pair_label.into(),
        }
    }

    /// Attach a venue-reported fee. Does not adjust buy/sell.
    pub fn with_fee(mut self, fee_percentage: Decimal) -> Self {
        self.fee_percentage = Some(fee_percentage);
        self
    }

    /// Override the effective sides; absent sides keep the spot price.
    pub fn with_sides(mut self, buy: Option<Decimal>, sell: Option<Decimal>) -> Self {
        self.buy_price = buy.unwrap_or(self.spot_price);
        self.sell_price = sell.unwrap_or(self.spot_price);
        self
    }

    /// Whether the quote carries a usable price.
    pub fn is_valid(&self) -> bool {
        !self.spot_price.is_sign_negative()
    }
}

/// One observation in the append-only time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Wall-clock time the orchestrator stamped the quote.
    pub captured_at: DateTime<Utc>,
    /// Venue name.
    pub dex_name: String,
    /// Pair label from the quote.
    pub token_pair: String,
    pub spot_price: Decimal,
    pub fee_percentage: Option<Decimal>,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
}

impl PriceRecord {
    /// Stamp a quote for the given venue.
    pub fn from_quote(venue: &Venue, quote: PriceQuote, captured_at: DateTime<Utc>) -> Self {
        Self {
            captured_at,
            dex_name: venue.dex_name.clone(),
            token_pair: quote.pair_label,
            spot_price: quote.spot_price,
            fee_percentage: quote.fee_percentage,
            buy_price: quote.buy_price,
            sell_price: quote.sell_price,
        }
    }
}
