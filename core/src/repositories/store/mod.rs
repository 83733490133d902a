//! Entity store: the transactional contract every booking and review
//! operation runs through, plus the in-memory implementation.

mod memory;
mod r#trait;

pub use memory::{FailurePoint, InMemoryStore, InMemoryTransaction};
pub use r#trait::{EntityStore, StoreTransaction};
