//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `booking` - Booking and review policy limits
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration

pub mod booking;
pub mod database;
pub mod environment;

use serde::{Deserialize, Serialize};

pub use booking::BookingConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Booking and review policy
    #[serde(default)]
    pub booking: BookingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            booking: BookingConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig::new("mysql://localhost:3306/rentconnect_dev").with_logging(true),
            booking: BookingConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig::new("mysql://prod-db:3306/rentconnect").with_max_connections(50),
            booking: BookingConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };
        config.database = DatabaseConfig::from_env_or(config.database);
        config.booking = BookingConfig::from_env_or(config.booking);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_preset() {
        let config = AppConfig::production();
        assert!(config.environment.is_production());
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.booking.allow_self_booking);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = serde_json::json!({
            "environment": "staging",
            "database": { "url": "mysql://db/rc", "max_connections": 4, "connect_timeout": 5,
                          "idle_timeout": 60, "max_lifetime": 120 }
        });
        let config: AppConfig = serde_json::from_value(json).unwrap();
        assert!(config.environment.is_staging());
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.booking.max_rating, 5);
        assert_eq!(config.logging.level, "info");
    }
}
