//! Shared utilities and common types for the RentConnect server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (database, booking policy, environment, logging)
//! - Text utilities (slug derivation, input checks)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, BookingConfig, DatabaseConfig, Environment, LogFormat, LoggingConfig,
};
pub use utils::{slug, validation};
