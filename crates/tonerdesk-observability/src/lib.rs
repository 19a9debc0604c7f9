//! TonerDesk Observability Module
//!
//! Logging setup shared by the server and the CLI:
//! - console, error-file and JSON-file tracing layers
//! - HTTP request/response logging middleware
//!
//! File logging is compiled in with the `observability` feature (default).
//! Without it, [`init_tracing`] falls back to console output only.
//!
//! # Examples
//!
//! ```no_run
//! use tonerdesk_observability::init_tracing;
//!
//! fn main() {
//!     // Keep the guards alive until shutdown so buffered lines are flushed.
//!     let _guards = init_tracing();
//! }
//! ```

pub mod basic_logging;
pub mod middleware;

#[cfg(feature = "observability")]
pub mod logging;

pub use basic_logging::init_basic_console_logging;
pub use middleware::logging_middleware;

#[cfg(feature = "observability")]
pub use logging::{LogGuards, init_tracing, log_dir};

#[cfg(not(feature = "observability"))]
pub mod stubs {
    /// Nothing to flush when file logging is compiled out.
    pub struct LogGuards;

    /// Console-only tracing when the feature is disabled
    pub fn init_tracing() -> LogGuards {
        crate::basic_logging::init_basic_console_logging();
        LogGuards
    }
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
