//! Listing management for owners.

mod service;

pub use service::{ListingService, FEATURED_LISTINGS};
