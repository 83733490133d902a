//! Typed validation and booking errors bridged into `DomainError`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::rental::RentalStatus;

/// Validation errors
///
/// These errors represent input validation failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Rental too long: {days} days (max: {max})")]
    RentalTooLong { days: i64, max: u32 },

    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Out of range: {field} (min: {min}, max: {max})")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    #[error("Duplicate value: {field}")]
    DuplicateValue { field: String },

    #[error("Business rule violation: {rule}")]
    BusinessRuleViolation { rule: String },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            ValidationError::RentalTooLong { .. } => "RENTAL_TOO_LONG",
            ValidationError::RequiredField { .. } => "REQUIRED_FIELD",
            ValidationError::InvalidFormat { .. } => "INVALID_FORMAT",
            ValidationError::OutOfRange { .. } => "OUT_OF_RANGE",
            ValidationError::DuplicateValue { .. } => "DUPLICATE_VALUE",
            ValidationError::BusinessRuleViolation { .. } => "BUSINESS_RULE_VIOLATION",
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        ValidationError::InvalidFormat {
            field: fields.join(","),
        }
    }
}

/// Booking engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("Listing {listing_id} is not available from {start} to {end}")]
    DateRangeConflict {
        listing_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Listing {listing_id} is not active")]
    ListingInactive { listing_id: Uuid },

    #[error("Owners cannot book their own listing")]
    SelfBooking,

    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition { from: RentalStatus, to: RentalStatus },

    #[error("Invalid status value: {value}")]
    InvalidStatus { value: String },
}

impl BookingError {
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::DateRangeConflict { .. } => "DATE_RANGE_CONFLICT",
            BookingError::ListingInactive { .. } => "LISTING_INACTIVE",
            BookingError::SelfBooking => "SELF_BOOKING",
            BookingError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            BookingError::InvalidStatus { .. } => "INVALID_STATUS",
        }
    }
}
