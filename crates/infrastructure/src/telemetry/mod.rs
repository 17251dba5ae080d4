//! Logging setup
//!
//! Console logging through `tracing-subscriber`, human readable or JSON.
//! `RUST_LOG` takes precedence over the configured filter.

mod subscriber;

pub use subscriber::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
