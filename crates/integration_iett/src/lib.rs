//! iett-middle integration
//!
//! Async REST client for the [iett-middle](https://github.com/iett-feeds/iett-middle)
//! backend, which relays the Istanbul IETT SOAP services as JSON.
//!
//! # Architecture
//!
//! [`IettMiddleClient`] issues one GET per call and decodes the body into the
//! records from the `domain` crate. Any transport, status or decode failure
//! surfaces as a single [`IettMiddleError`] naming the URL that failed.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::StopCode;
//! use integration_iett::{IettMiddleClient, MiddleConfig};
//!
//! let client = IettMiddleClient::new(&MiddleConfig::default())?;
//! let stop = StopCode::new("220602")?;
//!
//! let arrivals = client.get_stop_arrivals(&stop, None).await?;
//! ```

mod client;
mod config;
mod error;

pub use client::{IettMiddleClient, JsonObject};
pub use config::MiddleConfig;
pub use error::{ConfigurationError, IettMiddleError};
