/*
[INPUT]:  Human-entered ether amounts and on-chain wei integers
[OUTPUT]: Exact wei <-> ether conversions
[POS]:    Units - decimal-safe amount handling
[UPDATE]: When the reward currency's decimals change
*/

use alloy_primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Decimals of the native currency.
pub const ETHER_DECIMALS: u32 = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid amount: {0}")]
    Unparsable(String),

    #[error("amount must be positive")]
    NotPositive,

    #[error("amount has more than {ETHER_DECIMALS} fractional digits")]
    TooPrecise,

    #[error("amount out of range")]
    OutOfRange,
}

/// Parse a positive ether amount into wei without rounding.
pub fn parse_ether(input: &str) -> Result<U256, UnitsError> {
    let trimmed = input.trim();
    let amount = Decimal::from_str_exact(trimmed)
        .map_err(|_| UnitsError::Unparsable(trimmed.to_string()))?;

    if amount.is_sign_negative() || amount.is_zero() {
        return Err(UnitsError::NotPositive);
    }

    ether_to_wei(amount)
}

/// Convert a non-negative ether `Decimal` to wei.
pub fn ether_to_wei(amount: Decimal) -> Result<U256, UnitsError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(UnitsError::NotPositive);
    }

    let amount = amount.normalize();
    let scale = amount.scale();
    if scale > ETHER_DECIMALS {
        return Err(UnitsError::TooPrecise);
    }

    let mantissa = u128::try_from(amount.mantissa()).map_err(|_| UnitsError::OutOfRange)?;
    let factor = U256::from(10u64).pow(U256::from(ETHER_DECIMALS - scale));
    U256::from(mantissa)
        .checked_mul(factor)
        .ok_or(UnitsError::OutOfRange)
}

/// Render wei as ether with trailing zeros trimmed. Exact for any `U256`.
pub fn format_ether(wei: U256) -> String {
    let digits = wei.to_string();
    let width = ETHER_DECIMALS as usize + 1;
    let padded = format!("{digits:0>width$}");
    let (whole, fraction) = padded.split_at(padded.len() - ETHER_DECIMALS as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_parse_half_ether_is_exact() {
        assert_eq!(
            parse_ether("0.5").unwrap(),
            U256::from(500_000_000_000_000_000u64)
        );
    }

    #[rstest]
    #[case("1", ether(1))]
    #[case(" 2.25 ", U256::from(2_250_000_000_000_000_000u64))]
    #[case("0.000000000000000001", U256::from(1u64))]
    #[case("1.500", U256::from(1_500_000_000_000_000_000u64))]
    fn test_parse_ether_valid(#[case] input: &str, #[case] expected: U256) {
        assert_eq!(parse_ether(input).unwrap(), expected);
    }

    #[rstest]
    #[case("0", UnitsError::NotPositive)]
    #[case("-1", UnitsError::NotPositive)]
    #[case("0.0000000000000000001", UnitsError::TooPrecise)]
    #[case("abc", UnitsError::Unparsable("abc".to_string()))]
    #[case("", UnitsError::Unparsable(String::new()))]
    fn test_parse_ether_invalid(#[case] input: &str, #[case] expected: UnitsError) {
        assert_eq!(parse_ether(input).unwrap_err(), expected);
    }

    #[test]
    fn test_parse_ether_inverts_format_ether() {
        for wei in [
            U256::from(1u64),
            U256::from(500_000_000_000_000_000u64),
            ether(42),
        ] {
            assert_eq!(parse_ether(&format_ether(wei)).unwrap(), wei);
        }
        assert_eq!(
            ether_to_wei(Decimal::from(-1)),
            Err(UnitsError::NotPositive)
        );
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(U256::ZERO), "0");
        assert_eq!(format_ether(ether(12)), "12");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(
            format_ether(U256::from(1_250_000_000_000_000_000u64)),
            "1.25"
        );
    }
}
