//! Decimal arithmetic helpers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Round a decimal to a specific number of decimal places.
pub fn round_to_precision(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp(decimals)
}

/// Safe division that returns zero if divisor is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Signed percentage gap of `a` over `b`, zero when `b` is zero.
pub fn percentage_diff(a: Decimal, b: Decimal) -> Decimal {
    safe_div(a - b, b) * dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(dec!(3.14159), 2), dec!(3.14));
        assert_eq!(round_to_precision(dec!(2.5), 0), dec!(2));
    }

    #[test]
    fn test_safe_div_by_zero() {
        assert_eq!(safe_div(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(dec!(10), dec!(4)), dec!(2.5));
    }

    #[test]
    fn test_percentage_diff_is_signed() {
        assert_eq!(percentage_diff(dec!(110), dec!(100)), dec!(10));
        assert_eq!(percentage_diff(dec!(90), dec!(100)), dec!(-10));
        assert_eq!(percentage_diff(dec!(90), Decimal::ZERO), Decimal::ZERO);
    }
}
