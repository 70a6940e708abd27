//! Currency arithmetic helpers.

use rust_decimal::Decimal;

/// Round a monetary amount to 2 decimal places.
///
/// Uses banker's rounding (midpoint-to-even), the rounding mode the rest of
/// the procurement pipeline and the relational NUMERIC(18,2) columns assume.
/// The scale is pinned to exactly two digits so serialized amounts always
/// read `2850.00`, never `2850.0`.
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_currency(dec!(2850.005)), dec!(2850.00));
        assert_eq!(round_currency(dec!(12.345)), dec!(12.34));
        assert_eq!(round_currency(dec!(12.355)), dec!(12.36));
        assert_eq!(round_currency(dec!(10)), dec!(10));
    }

    #[test]
    fn scale_is_pinned_to_two_digits() {
        assert_eq!(round_currency(dec!(2850.0)).to_string(), "2850.00");
        assert_eq!(round_currency(dec!(27)).to_string(), "27.00");
    }
}
