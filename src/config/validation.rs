//! Configuration validation.
//!
//! Semantic checks that serde cannot express. Returns every error found,
//! not just the first one.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("crm.api_key must not be empty")]
    MissingApiKey,

    #[error("crm.subdomain must not be empty")]
    MissingSubdomain,

    #[error("crm.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),

    #[error("rate_limit.{0} must be greater than zero when rate limiting is enabled")]
    ZeroRateLimit(&'static str),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.crm.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }

    match &config.crm.base_url {
        Some(base) => {
            if let Err(e) = url::Url::parse(base) {
                errors.push(ValidationError::InvalidBaseUrl(format!("{}: {}", base, e)));
            }
        }
        None => {
            if config.crm.subdomain.trim().is_empty() {
                errors.push(ValidationError::MissingSubdomain);
            }
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.capacity == 0 {
            errors.push(ValidationError::ZeroRateLimit("capacity"));
        }
        if config.rate_limit.period_ms == 0 {
            errors.push(ValidationError::ZeroRateLimit("period_ms"));
        }
    }

    for (name, value) in [
        ("connect_secs", config.timeouts.connect_secs),
        ("request_secs", config.timeouts.request_secs),
        ("call_secs", config.timeouts.call_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.crm.api_key = "key".to_string();
        config.crm.subdomain = "acme".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.rate_limit.capacity = 0;
        config.timeouts.call_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingApiKey));
        assert!(errors.contains(&ValidationError::MissingSubdomain));
        assert!(errors.contains(&ValidationError::ZeroRateLimit("capacity")));
        assert!(errors.contains(&ValidationError::ZeroTimeout("call_secs")));
    }

    #[test]
    fn test_disabled_rate_limit_skips_checks() {
        let mut config = valid_config();
        config.rate_limit.enabled = false;
        config.rate_limit.capacity = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_base_url_replaces_subdomain_requirement() {
        let mut config = valid_config();
        config.crm.subdomain.clear();
        config.crm.base_url = Some("http://127.0.0.1:9000/api/v5/".to_string());
        assert!(validate_config(&config).is_ok());

        config.crm.base_url = Some("not a url".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_bad_bind_address() {
        let mut config = valid_config();
        config.listener.bind_address = "localhost".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("listener.bind_address"));
    }
}
