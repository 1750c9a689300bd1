//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (credentials, bind address)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CrmConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig, RetryConfig,
    TimeoutConfig,
};
pub use validation::ValidationError;
