//! # Infrastructure Layer
//!
//! Concrete implementations behind the RentConnect core:
//!
//! - **Database**: MySQL entity store on SQLx, with row-locking
//!   transactions and embedded migrations
//! - **Telemetry**: `tracing-subscriber` setup driven by `LoggingConfig`
//! - **Configuration**: layered loading of `AppConfig`
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use rc_core::services::MarketplaceServices;
use rc_shared::AppConfig;

// Re-export core types for convenience
pub use rc_core::errors::*;

pub mod config;
pub mod telemetry;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

#[cfg(feature = "mysql")]
use database::{DatabasePool, MySqlEntityStore};

/// Everything a host process needs to serve marketplace requests
#[cfg(feature = "mysql")]
pub struct Infrastructure {
    pub config: AppConfig,
    pub pool: DatabasePool,
    pub services: MarketplaceServices<MySqlEntityStore>,
}

/// Initialize infrastructure services
///
/// This function:
/// - Loads layered configuration
/// - Installs the tracing subscriber
/// - Creates the database pool and runs pending migrations
/// - Wires the marketplace services onto the MySQL store
#[cfg(feature = "mysql")]
pub async fn initialize() -> Result<Infrastructure, InfrastructureError> {
    let config = crate::config::load_config()?;
    telemetry::init_tracing(&config.logging)?;
    tracing::info!(environment = %config.environment, "Initializing infrastructure services...");

    let pool = DatabasePool::new(config.database.clone()).await?;
    pool.run_migrations().await?;

    let store = std::sync::Arc::new(MySqlEntityStore::new(pool.get_pool().clone()));
    let services = MarketplaceServices::new(store, config.booking.clone());

    tracing::info!("Infrastructure services initialized successfully");
    Ok(Infrastructure {
        config,
        pool,
        services,
    })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Layered configuration could not be built or deserialized
    #[error("Configuration error: {0}")]
    Settings(#[from] ::config::ConfigError),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
