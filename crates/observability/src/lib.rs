//! Observability setup for the dealer cache tools
//!
//! Structured logging via tracing. Cache operations report metrics through
//! the `metrics` facade directly; installing a recorder is left to the
//! host process.
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("dealerctl", LogFormat::Pretty, "info")?;
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat};
