//! Resilience subsystem for outbound CRM calls.
//!
//! # Data Flow
//! ```text
//! Logical call:
//!     → timeouts.rs (deadline over the whole call)
//!     → retries.rs (bounded loop, classified failures)
//!         → rate_limit.rs (acquire before every attempt)
//!         → backoff.rs (optional delay between attempts)
//! ```
//!
//! # Design Decisions
//! - One limiter per client, shared by all in-flight calls
//! - Retry decisions come from the failure taxonomy, never from HTTP status directly
//! - Every logical call has a deadline

pub mod backoff;
pub mod rate_limit;
pub mod retries;
pub mod timeouts;

pub use rate_limit::RateLimiter;
pub use retries::{RetryBudget, RetryController};
