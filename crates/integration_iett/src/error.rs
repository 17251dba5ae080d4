//! iett-middle error types

use std::error::Error as StdError;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// A failed backend call.
///
/// Transport failures, non-2xx statuses and undecodable bodies all surface as
/// this one error; callers only learn which URL failed and why.
#[derive(Debug, Error)]
#[error("GET {url} failed: {source}")]
pub struct IettMiddleError {
    url: String,
    #[source]
    source: BoxError,
}

impl IettMiddleError {
    /// Wrap a failure of the request to `url`
    pub fn new(url: impl ToString, source: impl Into<BoxError>) -> Self {
        Self {
            url: url.to_string(),
            source: source.into(),
        }
    }

    /// The URL that was requested
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Errors raised while building a client from its configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Base URL is not an absolute http(s) URL
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl {
        /// The configured value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The HTTP client could not be initialised
    #[error("HTTP client initialisation failed: {0}")]
    ClientInit(String),
}
