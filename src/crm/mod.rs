//! Outbound RetailCRM API client.
//!
//! # Data Flow
//! ```text
//! CrmClient::create_order(&NewOrder)
//!     → operations.rs (upstream field names and nesting)
//!     → encoder.rs (drop absent fields, flatten to text)
//!     → resilience::RateLimiter::acquire()
//!     → transport.rs (one authenticated HTTP request)
//!     → envelope.rs (classify into success or CrmError)
//!     → resilience::RetryController (retry or surface)
//!     → envelope::decode_payload (typed result)
//! ```
//!
//! # Design Decisions
//! - The transport is a trait so the pipeline runs against fakes in tests
//! - Failures are values (`CrmError`), retry policy reads only their kind
//! - Request descriptors are immutable; retries re-send the same encoding

pub mod client;
pub mod encoder;
pub mod envelope;
pub mod error;
pub mod operations;
pub mod transport;
pub mod types;

pub use client::CrmClient;
pub use encoder::{encode, EncodedRequest, RequestDescriptor};
pub use envelope::{classify, Classification, RawResponse};
pub use error::{CrmError, CrmResult, TransportError};
pub use transport::{HttpTransport, Transport};
