//! Thumbnailer Infrastructure Library
//!
//! Shared runtime plumbing for the thumbnailer entry points. Currently this is
//! tracing initialization, configured for either CloudWatch-friendly output or
//! an interactive terminal.

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, TelemetryOptions};
