//! Domain entities representing core business objects.

pub mod listing;
pub mod rental;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use listing::{Listing, ListingDraft, ListingStatistics};
pub use rental::{Rental, RentalStatus};
pub use review::Review;
pub use user::{ProfileUpdate, User};
