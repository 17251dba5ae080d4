//! Application layer - Use cases and orchestration
//!
//! Feed coordination, sensor projection and the entry lifecycle (setup
//! wizard, setup, teardown). Talks to the backend only through the
//! [`MiddleApiPort`] implemented in the infrastructure layer.

pub mod config_entry;
pub mod error;
pub mod ports;
pub mod services;

pub use config_entry::{ConfigEntry, DEFAULT_MIDDLE_URL, EntryData};
pub use error::{ApplicationError, BoxError};
pub use ports::*;
pub use services::*;
