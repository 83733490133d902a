//! Business services containing domain logic and use cases.

pub mod authorization;
pub mod availability;
pub mod listing;
pub mod marketplace;
pub mod pricing;
pub mod rating;
pub mod rental;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use authorization::{Action, Authorizer};
pub use availability::{ensure_available, find_conflict, AvailabilityChecker};
pub use listing::{ListingService, FEATURED_LISTINGS};
pub use marketplace::MarketplaceServices;
pub use pricing::PricingCalculator;
pub use rating::{RatingAggregator, RatingUpdate};
pub use rental::RentalService;
pub use review::{ReviewOutcome, ReviewService};
pub use user::UserService;
