//! Property-Based Tests - Pricing and Storage Invariants
//!
//! Uses `proptest` to verify price-text normalization, pool price
//! conversion and the price log's ordering/limit contract across
//! random inputs.

use alloy::primitives::U256;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use dex_price_collector::adapters::chain::pool_math::{TargetSide, sqrt_price_x96_to_price};
use dex_price_collector::adapters::persistence::PriceLog;
use dex_price_collector::domain::PriceRecord;
use dex_price_collector::domain::pricing::{clean_price_text, parse_price_text, title_segment};
use dex_price_collector::ports::{PriceQuery, PriceRepository};

/// Insert thousands separators into an integer string.
fn with_thousands(int: u64) -> String {
    let digits = int.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Price Text Properties ───────────────────────────────────

proptest! {
    /// Displayed prices with symbols, separators and padding parse to
    /// the underlying value.
    #[test]
    fn formatted_price_parses_to_value(
        int in 0u64..10_000_000_000,
        frac in 0u32..10_000,
        symbol in prop::sample::select(vec!["", "$", "€", "₮"]),
        pad in prop::sample::select(vec!["", " ", "  ", "\u{a0}"]),
    ) {
        let text = format!("{pad}{symbol}{}.{frac:04}{pad}", with_thousands(int));
        let expected = (Decimal::from(int) + Decimal::new(i64::from(frac), 4)).normalize();
        prop_assert_eq!(parse_price_text(&text), Some(expected));
    }

    /// Cleaning removes every separator, symbol and whitespace char.
    #[test]
    fn cleaned_text_has_no_noise(raw in "[ $€,0-9.\\t]{0,24}") {
        let cleaned = clean_price_text(&raw);
        prop_assert!(!cleaned.chars().any(|c| c.is_whitespace() || c == ',' || c == '$' || c == '€'));
    }

    /// Parsing never yields a negative price.
    #[test]
    fn parsed_price_is_never_negative(raw in "-?[$0-9.,]{1,16}") {
        if let Some(value) = parse_price_text(&raw) {
            prop_assert!(!value.is_sign_negative(), "negative price {value} from {raw:?}");
        }
    }

    /// The first title segment is the price, whatever follows it.
    #[test]
    fn title_segment_returns_leading_price(
        cents in 1u64..100_000_000,
        rest in "[A-Za-z ]{0,20}",
        separator in prop::sample::select(vec!["|", "•"]),
    ) {
        let price = Decimal::new(i64::try_from(cents).unwrap(), 2);
        let title = format!("${price} {separator} {rest}");
        prop_assert_eq!(parse_price_text(title_segment(&title, separator)), Some(price.normalize()));
    }
}

// ── Pool Price Properties ───────────────────────────────────

proptest! {
    /// An integer multiple `k` of 2^96 prices token0 at exactly `k²`.
    #[test]
    fn integer_sqrt_price_squares_exactly(k in 1u64..1_000_000) {
        let raw = U256::from(k) << 96usize;
        let price = sqrt_price_x96_to_price(raw, 18, 18, TargetSide::Token0).unwrap();
        prop_assert_eq!(price, Decimal::from(k * k));
    }

    /// Token0 and token1 prices are reciprocal within truncation error.
    #[test]
    fn sides_are_reciprocal(
        k in 1u64..10_000,
        d0 in prop::sample::select(vec![6u8, 8, 18]),
        d1 in prop::sample::select(vec![6u8, 8, 18]),
    ) {
        let raw = U256::from(k) << 96usize;
        let p0 = sqrt_price_x96_to_price(raw, d0, d1, TargetSide::Token0).unwrap();
        let p1 = sqrt_price_x96_to_price(raw, d0, d1, TargetSide::Token1).unwrap();
        prop_assert!(p0 > Decimal::ZERO);
        prop_assert!(p1 > Decimal::ZERO);

        let product = p0 * p1;
        let tolerance = Decimal::new(1, 6);
        prop_assert!(
            (product - Decimal::ONE).abs() < tolerance,
            "p0={p0} p1={p1} product={product}"
        );
    }

    /// Shifting decimals by `n` scales the token0 price by `10^n`.
    #[test]
    fn decimal_gap_scales_price(k in 1u64..1_000, gap in 0u8..=12) {
        let raw = U256::from(k) << 96usize;
        let base = sqrt_price_x96_to_price(raw, 6, 6, TargetSide::Token0).unwrap();
        let shifted = sqrt_price_x96_to_price(raw, 6 + gap, 6, TargetSide::Token0).unwrap();
        prop_assert_eq!(shifted, base * Decimal::from(10u64.pow(u32::from(gap))));
    }
}

// ── Price Log Properties ────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// `query(limit)` returns at most `limit` records, newest first,
    /// across day partitions.
    #[test]
    fn query_respects_limit_and_order(
        offsets in prop::collection::vec(0i64..200_000, 0..20),
        limit in 0usize..25,
    ) {
        let dir = std::env::temp_dir()
            .join(format!("price-log-prop-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();

        let records = tokio_test::block_on(async {
            let log = PriceLog::open(&dir).await.unwrap();
            let base = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
            for offset in &offsets {
                let record = PriceRecord {
                    captured_at: base + Duration::seconds(*offset),
                    dex_name: "HyperSwap V3".to_string(),
                    token_pair: "WHYPE / USD₮0 0.05%".to_string(),
                    spot_price: Decimal::new(406_773, 4),
                    fee_percentage: None,
                    buy_price: Decimal::new(406_773, 4),
                    sell_price: Decimal::new(406_773, 4),
                };
                log.append(&record).await.unwrap();
            }
            let query = PriceQuery { dex_name: None, limit: Some(limit) };
            log.query(&query).await.unwrap()
        });
        let _ = std::fs::remove_dir_all(&dir);

        prop_assert_eq!(records.len(), limit.min(offsets.len()));
        prop_assert!(records.windows(2).all(|w| w[0].captured_at >= w[1].captured_at));

        if let Some(newest) = records.first() {
            let max_offset = offsets.iter().copied().max().unwrap();
            let base = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
            prop_assert_eq!(newest.captured_at, base + Duration::seconds(max_offset));
        }
    }
}
