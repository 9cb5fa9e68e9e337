//! # Gateway Telemetry
//!
//! Structured logging for the relay gateway.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, TracingConfig, TracingError};
