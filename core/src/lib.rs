//! # RentConnect Core
//!
//! Core business logic and domain layer for the RentConnect backend.
//! This crate contains the rental booking engine (availability, pricing,
//! rental lifecycle), incremental rating aggregation, domain entities,
//! the entity store contract, and error types.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::{
    BookingPeriod, Listing, ListingDraft, ListingStatistics, Principal, ProfileUpdate, RatingAggregate,
    Rental, RentalStatus, Review, User, ROLE_USER,
};
pub use errors::{BookingError, DomainError, DomainResult, ValidationError};
pub use repositories::{
    EntityStore, InMemoryStore, ListingRepository, RentalRepository, ReviewRepository, StoreTransaction,
    UserRepository,
};
pub use services::{
    AvailabilityChecker, ListingService, MarketplaceServices, PricingCalculator, RatingAggregator, RentalService,
    ReviewService, UserService,
};
