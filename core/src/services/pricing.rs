//! Total price derivation for a booking period.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::value_objects::{check_money_amount, BookingPeriod};
use crate::errors::{DomainResult, ValidationError};

/// Stateless price calculator. Arithmetic is exact decimal, never float.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingCalculator;

impl PricingCalculator {
    /// `price_per_day * days`, where a single-day booking counts as one day
    ///
    /// # Errors
    /// * `ValidationError::OutOfRange` - Non-positive price, or a total above
    ///   the largest storable amount
    /// * `ValidationError::InvalidFormat` - Price with more fraction digits
    ///   than the store keeps
    pub fn compute_total(price_per_day: Decimal, period: &BookingPeriod) -> DomainResult<Decimal> {
        if price_per_day <= Decimal::ZERO {
            return Err(ValidationError::OutOfRange {
                field: "price_per_day".to_string(),
                min: "0 (exclusive)".to_string(),
                max: "unbounded".to_string(),
            }
            .into());
        }
        check_money_amount("price_per_day", price_per_day)?;
        let total = price_per_day
            .checked_mul(Decimal::from(period.days()))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total_price".to_string(),
                min: "0".to_string(),
                max: Decimal::MAX.to_string(),
            })?;
        check_money_amount("total_price", total)?;
        Ok(total)
    }

    /// Same as [`compute_total`](Self::compute_total) for raw dates
    ///
    /// # Errors
    /// * `ValidationError::InvalidDateRange` - `end` is before `start`
    pub fn compute_total_for_dates(
        price_per_day: Decimal,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Decimal> {
        let period = BookingPeriod::new(start, end)?;
        Self::compute_total(price_per_day, &period)
    }
}
