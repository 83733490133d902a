//! Booking and review policy configuration

use serde::{Deserialize, Serialize};

/// Limits applied by the booking engine and the review flow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookingConfig {
    /// Whether a listing owner may book their own listing
    #[serde(default)]
    pub allow_self_booking: bool,

    /// Longest bookable period, in days (inclusive count)
    #[serde(default = "default_max_rental_days")]
    pub max_rental_days: u32,

    /// Lowest accepted review rating
    #[serde(default = "default_min_rating")]
    pub min_rating: u8,

    /// Highest accepted review rating
    #[serde(default = "default_max_rating")]
    pub max_rating: u8,

    /// Maximum review text length in characters
    #[serde(default = "default_max_review_length")]
    pub max_review_length: usize,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            allow_self_booking: false,
            max_rental_days: default_max_rental_days(),
            min_rating: default_min_rating(),
            max_rating: default_max_rating(),
            max_review_length: default_max_review_length(),
        }
    }
}

impl BookingConfig {
    /// Override `base` with any `BOOKING_*` variables that are set and parse
    pub fn from_env_or(base: Self) -> Self {
        Self {
            allow_self_booking: env_parse("BOOKING_ALLOW_SELF_BOOKING").unwrap_or(base.allow_self_booking),
            max_rental_days: env_parse("BOOKING_MAX_RENTAL_DAYS").unwrap_or(base.max_rental_days),
            ..base
        }
    }

    /// Check a rating value against the configured bounds
    pub fn rating_in_bounds(&self, rating: u8) -> bool {
        (self.min_rating..=self.max_rating).contains(&rating)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_max_rental_days() -> u32 {
    365
}

fn default_min_rating() -> u8 {
    1
}

fn default_max_rating() -> u8 {
    5
}

fn default_max_review_length() -> usize {
    2000
}
