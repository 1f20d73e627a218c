//! Concentrated-Liquidity Pool Math - sqrtPriceX96 Conversion
//!
//! Uniswap-V3-style pools publish `sqrtPriceX96 = sqrt(token1/token0) * 2^96`
//! in raw token units. Squaring a 160-bit value needs 320 bits and the
//! decimal scaling adds more, so all arithmetic runs on 512-bit integers
//! and only the final quotient is narrowed to a `Decimal`.
//!
//! Also holds the small ABI word decoders used by the pool reader.

use alloy::primitives::{Address, U256, Uint};
use rust_decimal::Decimal;

/// 512-bit unsigned integer for intermediate products.
pub type U512 = Uint<512, 8>;

/// Fractional digits computed before narrowing (the `Decimal` maximum).
const PRICE_SCALE: u32 = 28;

/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const DECIMAL_MAX_MANTISSA: u128 = (1u128 << 96) - 1;

/// Which pool token the price is expressed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSide {
    /// Price of token0 denominated in token1.
    Token0,
    /// Price of token1 denominated in token0.
    Token1,
}

/// Convert a raw `sqrtPriceX96` into a human price.
///
/// For `Token0` this is `(raw / 2^96)^2 * 10^(decimals0 - decimals1)`;
/// `Token1` is its reciprocal. Returns `None` on a zero price when
/// inverting, or when the result does not fit a `Decimal`.
pub fn sqrt_price_x96_to_price(
    sqrt_price_x96: U256,
    decimals0: u8,
    decimals1: u8,
    side: TargetSide,
) -> Option<Decimal> {
    let raw = U512::from(sqrt_price_x96);
    let squared = raw.checked_mul(raw)?;
    let q192 = U512::from(1u8) << 192usize;

    let scale0 = pow10(u32::from(decimals0))?;
    let scale1 = pow10(u32::from(decimals1))?;

    // price0 = raw^2 * 10^d0 / (2^192 * 10^d1)
    let (num, den) = match side {
        TargetSide::Token0 => (squared.checked_mul(scale0)?, q192.checked_mul(scale1)?),
        TargetSide::Token1 => (q192.checked_mul(scale1)?, squared.checked_mul(scale0)?),
    };

    ratio_to_decimal(num, den)
}

/// Exact `num / den` truncated to at most 28 fractional digits.
///
/// Drops trailing fractional digits only while the mantissa does not
/// fit in 96 bits, so small prices keep their significant digits.
pub fn ratio_to_decimal(num: U512, den: U512) -> Option<Decimal> {
    if den.is_zero() {
        return None;
    }

    let mut quotient = num.checked_mul(pow10(PRICE_SCALE)?)? / den;
    let mut scale = PRICE_SCALE;
    let max = U512::from(DECIMAL_MAX_MANTISSA);
    let ten = U512::from(10u8);

    while quotient > max && scale > 0 {
        quotient /= ten;
        scale -= 1;
    }
    if quotient > max {
        return None;
    }

    let limbs = quotient.as_limbs();
    let mantissa = u128::from(limbs[0]) | (u128::from(limbs[1]) << 64);
    let mantissa = i128::try_from(mantissa).ok()?;

    Decimal::try_from_i128_with_scale(mantissa, scale)
        .ok()
        .map(|d| d.normalize())
}

/// Pool fee tier in hundredths of a basis point as a percentage
/// (`3000` → `0.3`).
pub fn fee_tier_percentage(fee: u32) -> Decimal {
    Decimal::new(i64::from(fee), 4).normalize()
}

fn pow10(exp: u32) -> Option<U512> {
    U512::from(10u8).checked_pow(U512::from(exp))
}

// ── ABI word decoding ──────────────────────────────────────

/// First 32-byte return word as `U256`.
pub fn decode_word(data: &[u8]) -> Option<U256> {
    data.get(..32).map(U256::from_be_slice)
}

/// First return word as an address (low 20 bytes).
pub fn decode_address(data: &[u8]) -> Option<Address> {
    data.get(12..32).map(Address::from_slice)
}

/// First return word as a `uint8`.
pub fn decode_u8(data: &[u8]) -> Option<u8> {
    let word = decode_word(data)?;
    u8::try_from(word).ok()
}

/// First return word as a `uint24` fee.
pub fn decode_fee(data: &[u8]) -> Option<u32> {
    let word = decode_word(data)?;
    u32::try_from(word).ok().filter(|fee| *fee < (1 << 24))
}

/// Dynamic ABI `string`, falling back to a null-padded `bytes32`
/// (older tokens return their symbol that way).
pub fn decode_string(data: &[u8]) -> Option<String> {
    if data.len() == 32 {
        let trimmed: Vec<u8> = data.iter().copied().take_while(|b| *b != 0).collect();
        return String::from_utf8(trimmed).ok().filter(|s| !s.is_empty());
    }

    let offset = usize::try_from(decode_word(data)?).ok()?;
    let len_word = data.get(offset..offset.checked_add(32)?)?;
    let len = usize::try_from(U256::from_be_slice(len_word)).ok()?;
    let start = offset + 32;
    let bytes = data.get(start..start.checked_add(len)?)?;

    String::from_utf8(bytes.to_vec()).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn q96() -> U256 {
        U256::from(1u8) << 96usize
    }

    #[test]
    fn test_unit_sqrt_price_is_one() {
        let price = sqrt_price_x96_to_price(q96(), 18, 18, TargetSide::Token0).unwrap();
        assert_eq!(price, Decimal::ONE);
        let inverse = sqrt_price_x96_to_price(q96(), 18, 18, TargetSide::Token1).unwrap();
        assert_eq!(inverse, Decimal::ONE);
    }

    #[test]
    fn test_double_sqrt_price_is_four() {
        let raw = q96() * U256::from(2u8);
        let price = sqrt_price_x96_to_price(raw, 6, 6, TargetSide::Token0).unwrap();
        assert_eq!(price, dec!(4));
        let inverse = sqrt_price_x96_to_price(raw, 6, 6, TargetSide::Token1).unwrap();
        assert_eq!(inverse, dec!(0.25));
    }

    #[test]
    fn test_decimal_difference_scales_result() {
        // 1 raw unit of token1 per raw unit of token0, token0 has 18
        // decimals and token1 has 6: one whole token0 buys 10^12 token1.
        let price = sqrt_price_x96_to_price(q96(), 18, 6, TargetSide::Token0).unwrap();
        assert_eq!(price, dec!(1_000_000_000_000));
        let inverse = sqrt_price_x96_to_price(q96(), 18, 6, TargetSide::Token1).unwrap();
        assert_eq!(inverse, dec!(0.000000000001));
    }

    #[test]
    fn test_small_inverse_keeps_significant_digits() {
        // 17^2 * 10^12 token1 per token0; the inverse is ~3.46e-15.
        let raw = q96() * U256::from(17u8);
        let price = sqrt_price_x96_to_price(raw, 18, 6, TargetSide::Token0).unwrap();
        let inverse = sqrt_price_x96_to_price(raw, 18, 6, TargetSide::Token1).unwrap();
        assert_eq!(price, dec!(289_000_000_000_000));
        assert_eq!(inverse, dec!(0.0000000000000034602076124567));
        assert!((price * inverse - Decimal::ONE).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_zero_price_cannot_be_inverted() {
        assert!(sqrt_price_x96_to_price(U256::ZERO, 18, 6, TargetSide::Token1).is_none());
        assert_eq!(
            sqrt_price_x96_to_price(U256::ZERO, 18, 6, TargetSide::Token0),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn test_huge_ratio_drops_fraction_digits() {
        let value = ratio_to_decimal(U512::from(10u8).pow(U512::from(20u8)), U512::from(3u8)).unwrap();
        assert_eq!(value.trunc(), dec!(33333333333333333333));
    }

    #[test]
    fn test_fee_tier_percentage() {
        assert_eq!(fee_tier_percentage(3000), dec!(0.3));
        assert_eq!(fee_tier_percentage(500), dec!(0.05));
        assert_eq!(fee_tier_percentage(10_000), dec!(1));
    }

    #[test]
    fn test_decode_words() {
        let mut word = [0u8; 32];
        word[31] = 18;
        assert_eq!(decode_u8(&word), Some(18));
        assert_eq!(decode_word(&word[..16]), None);

        let mut addr_word = [0u8; 32];
        addr_word[12..].copy_from_slice(&[0x55; 20]);
        assert_eq!(decode_address(&addr_word), Some(Address::repeat_byte(0x55)));
    }

    #[test]
    fn test_decode_dynamic_string() {
        let mut data = vec![0u8; 96];
        data[31] = 0x20;
        data[63] = 5;
        data[64..69].copy_from_slice(b"WHYPE");
        assert_eq!(decode_string(&data).as_deref(), Some("WHYPE"));
    }

    #[test]
    fn test_decode_bytes32_symbol() {
        let mut data = [0u8; 32];
        data[..3].copy_from_slice(b"MKR");
        assert_eq!(decode_string(&data).as_deref(), Some("MKR"));
    }
}
