//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports over the iett-middle HTTP client and
//! hosts config entries: configuration loading, the refresh scheduler and
//! logging setup.

pub mod adapters;
pub mod config;
pub mod host;
pub mod scheduler;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, EntryConfig};
pub use host::{Host, HostError};
pub use scheduler::{FeedEvent, FeedScheduler, SchedulerConfig, SchedulerError};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
