//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_API_KEY: &str = "RETAILCRM_API_KEY";
pub const ENV_SUBDOMAIN: &str = "RETAILCRM_SUBDOMAIN";
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file plus process environment,
/// then validate it.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto the file configuration.
///
/// Credentials are normally supplied this way so they stay out of config files.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(ENV_API_KEY) {
        config.crm.api_key = key;
    }
    if let Some(subdomain) = lookup(ENV_SUBDOMAIN) {
        config.crm.subdomain = subdomain;
    }
    if let Some(bind) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind;
    }
}
