//! Tracing initialization
//!
//! Output only goes to stdout; the hosting platform collects it.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, TelemetryOptions};
