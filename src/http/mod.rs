//! Inbound HTTP surface.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → server.rs (CORS, request ID, tracing span, request logging)
//!     → handlers.rs (extract, validate via validation.rs)
//!     → CrmClient operation
//!     → error.rs (classified CRM failure → status code)
//!     → JSON response
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;
pub mod validation;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
