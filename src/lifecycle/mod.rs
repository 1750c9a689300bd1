//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Build CRM client → Probe → Listen
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → trigger → Stop accepting → Drain in-flight requests → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
