//! Repository and entity store contracts plus the in-memory store.

pub mod listing;
pub mod rental;
pub mod review;
pub mod store;
pub mod user;

pub use listing::ListingRepository;
pub use rental::RentalRepository;
pub use review::ReviewRepository;
pub use store::{EntityStore, FailurePoint, InMemoryStore, InMemoryTransaction, StoreTransaction};
pub use user::UserRepository;
