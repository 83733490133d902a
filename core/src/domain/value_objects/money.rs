//! Bounds for stored money amounts.
//!
//! Amounts are persisted as `DECIMAL(19, 4)`: at most four fraction digits
//! and fifteen integer digits.

use rust_decimal::Decimal;

use crate::errors::ValidationError;

/// Fraction digits kept by the store
pub const MONEY_SCALE: u32 = 4;

const MAX_MINOR_UNITS: i128 = 9_999_999_999_999_999_999;

/// Largest amount the store can hold
pub fn max_money_amount() -> Decimal {
    Decimal::from_i128_with_scale(MAX_MINOR_UNITS, MONEY_SCALE)
}

/// Reject amounts the store would round or refuse.
///
/// Trailing zeros do not count towards the scale, so `1.50000` passes.
pub fn check_money_amount(field: &str, amount: Decimal) -> Result<(), ValidationError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
        });
    }
    let max = max_money_amount();
    if amount.abs() > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: (-max).to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_four_fraction_digits_fit() {
        assert!(check_money_amount("price_per_day", dec!(0.1235)).is_ok());
        assert!(check_money_amount("price_per_day", dec!(1.50000)).is_ok());
    }

    #[test]
    fn test_fifth_fraction_digit_is_rejected() {
        assert_eq!(
            check_money_amount("price_per_day", dec!(0.12345)),
            Err(ValidationError::InvalidFormat {
                field: "price_per_day".to_string()
            })
        );
    }

    #[test]
    fn test_column_range() {
        assert!(check_money_amount("total_price", dec!(999999999999999.9999)).is_ok());
        assert!(matches!(
            check_money_amount("total_price", dec!(1000000000000000)),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "total_price"
        ));
    }
}
