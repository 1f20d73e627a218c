//! Price text normalization.
//!
//! Rendered pages display prices with currency symbols, thousands
//! separators and padding (`"$40.6773"`, `"1,234.5 "`). These helpers
//! reduce that to a non-negative `Decimal`.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Currency symbols stripped before parsing.
const CURRENCY_SYMBOLS: [char; 7] = ['$', '€', '£', '¥', '₮', '₿', '¢'];

/// Strip currency symbols, thousands separators and whitespace.
pub fn clean_price_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect()
}

/// Parse displayed price text into a non-negative decimal.
///
/// Returns `None` when nothing numeric remains after cleaning or the
/// value is negative.
pub fn parse_price_text(raw: &str) -> Option<Decimal> {
    let cleaned = clean_price_text(raw);
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;

    if value.is_sign_negative() {
        return None;
    }
    Some(value.normalize())
}

/// Leading segment of a page title before `separator`.
///
/// Titles look like `"0.1064 | HYPE | Hyperliquid"` or
/// `"$40.6773 • HYPE • Lighter"`; the price is the first segment.
pub fn title_segment<'a>(title: &'a str, separator: &str) -> &'a str {
    title.split(separator).next().unwrap_or(title).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_clean_strips_symbols_and_separators() {
        assert_eq!(clean_price_text(" $1,234.50 "), "1234.50");
        assert_eq!(clean_price_text("€\u{a0}0.98"), "0.98");
    }

    #[test]
    fn test_parse_plain_and_decorated_values() {
        assert_eq!(parse_price_text("40.6773"), Some(dec!(40.6773)));
        assert_eq!(parse_price_text("$40.6773"), Some(dec!(40.6773)));
        assert_eq!(parse_price_text("1,000"), Some(dec!(1000)));
        assert_eq!(parse_price_text("1.5e-3"), Some(dec!(0.0015)));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(parse_price_text(""), None);
        assert_eq!(parse_price_text("$"), None);
        assert_eq!(parse_price_text("Loading..."), None);
        assert_eq!(parse_price_text("-3.2"), None);
    }

    #[test]
    fn test_title_segment_takes_first_part() {
        assert_eq!(title_segment("0.1064 | HYPE | Hyperliquid", "|"), "0.1064");
        assert_eq!(title_segment("$40.6773 • HYPE • Lighter", "•"), "$40.6773");
        assert_eq!(title_segment("no separator", "|"), "no separator");
    }
}
