//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, request-id span from the http layer)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, text or JSON)
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
