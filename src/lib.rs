//! RetailCRM gateway library.
//!
//! A thin HTTP gateway over the RetailCRM v5 API. The core is the outbound
//! client in [`crm`]: rate limiting, request encoding, envelope
//! classification and bounded retries. [`http`] exposes it to callers.

pub mod config;
pub mod crm;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use crm::CrmClient;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
