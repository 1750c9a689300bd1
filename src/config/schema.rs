//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the CRM gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Inbound listener configuration.
    pub listener: ListenerConfig,

    /// Upstream CRM account and endpoint.
    pub crm: CrmConfig,

    /// Outbound rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Upstream CRM configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrmConfig {
    /// API key sent in the `X-API-KEY` header.
    pub api_key: String,

    /// Tenant subdomain (`{subdomain}.retailcrm.ru`).
    pub subdomain: String,

    /// API version path segment.
    pub api_version: String,

    /// Upstream host the subdomain is prefixed to.
    pub host: String,

    /// Full base URL override, e.g. for a staging account.
    pub base_url: Option<String>,

    /// Site code sent with create calls. Falls back to the subdomain.
    pub site: Option<String>,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            subdomain: String::new(),
            api_version: "v5".to_string(),
            host: "retailcrm.ru".to_string(),
            base_url: None,
            site: None,
        }
    }
}

impl CrmConfig {
    /// Base URL every API path is joined onto. Always ends with `/`.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) if url.ends_with('/') => url.clone(),
            Some(url) => format!("{}/", url),
            None => format!(
                "https://{}.{}/api/{}/",
                self.subdomain, self.host, self.api_version
            ),
        }
    }

    /// Site code for create calls.
    pub fn site(&self) -> &str {
        self.site.as_deref().unwrap_or(&self.subdomain)
    }
}

/// Outbound rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum calls per period.
    pub capacity: u32,

    /// Period length in milliseconds.
    pub period_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 10,
            period_ms: 1000,
        }
    }
}

impl RateLimitConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt of a logical call.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds. Zero retries immediately.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 0,
            max_delay_ms: 2000,
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Single attempt timeout in seconds.
    pub request_secs: u64,

    /// Deadline for a whole logical call, retries and rate-limit waits included.
    pub call_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            call_secs: 120,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
