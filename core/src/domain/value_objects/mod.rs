//! Value objects shared by entities and services.

pub mod booking_period;
pub mod money;
pub mod principal;
pub mod rating;

pub use booking_period::BookingPeriod;
pub use money::{check_money_amount, max_money_amount, MONEY_SCALE};
pub use principal::{Principal, ROLE_USER};
pub use rating::RatingAggregate;
