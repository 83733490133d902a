//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management and migrations
//! - The MySQL entity store and its transactions
//! - Classification of SQLx errors into domain errors

pub mod connection;
pub mod errors;
pub mod mysql;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use errors::{classify, is_duplicate_key};
pub use mysql::{MySqlEntityStore, MySqlTransaction};
