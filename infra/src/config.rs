//! Layered configuration loading.
//!
//! Order, later wins:
//! 1. presets for the environment named by `APP_ENV`
//! 2. optional `config/<environment>.{toml,yaml,json}` file
//! 3. `RC__*` variables, e.g. `RC__DATABASE__URL` or
//!    `RC__BOOKING__ALLOW_SELF_BOOKING`
//!
//! A `.env` file in the working directory is loaded first if present.

use ::config::{Config, Environment as EnvSource, File};
use rc_shared::{AppConfig, Environment};

use crate::InfrastructureError;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "RC";

/// Load the application configuration
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok();
    let environment = Environment::from_env();
    load_config_for(environment, AppConfig::from_env())
}

/// Layer the config file and `RC__*` variables over `defaults`
pub fn load_config_for(environment: Environment, defaults: AppConfig) -> Result<AppConfig, InfrastructureError> {
    let settings = Config::builder()
        .add_source(Config::try_from(&defaults)?)
        .add_source(File::with_name(environment.config_file()).required(false))
        .add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;
    config.environment = environment;
    validate(&config)?;

    tracing::debug!(environment = %config.environment, "configuration loaded");
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), InfrastructureError> {
    if config.booking.min_rating == 0 || config.booking.min_rating > config.booking.max_rating {
        return Err(InfrastructureError::Config(format!(
            "invalid rating bounds {}..={}",
            config.booking.min_rating, config.booking.max_rating
        )));
    }
    if config.booking.max_rental_days == 0 {
        return Err(InfrastructureError::Config(
            "max_rental_days must be at least 1".to_string(),
        ));
    }
    if config.database.max_connections == 0 {
        return Err(InfrastructureError::Config(
            "database.max_connections must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let config = load_config_for(Environment::Production, AppConfig::production()).unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.booking.max_rating, 5);
    }

    #[test]
    fn test_invalid_rating_bounds_are_rejected() {
        let mut defaults = AppConfig::development();
        defaults.booking.min_rating = 4;
        defaults.booking.max_rating = 2;

        let err = load_config_for(Environment::Development, defaults).unwrap_err();
        assert!(matches!(err, InfrastructureError::Config(_)));
    }
}
