//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Boxed cause of a backend failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error, e.g. an unknown feed type in a config entry
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backend call behind a port failed
    #[error("Backend error: {0}")]
    Backend(#[source] BoxError),

    /// A scheduled refresh failed; the previous snapshot is kept
    #[error("Refresh of {feed} failed: {reason}")]
    RefreshFailed {
        /// Feed being refreshed, e.g. `route_fleet[500T]`
        feed: String,
        /// Cause as reported by the port
        reason: String,
        source: Box<ApplicationError>,
    },

    /// The first refresh of a new entry failed; the entry was not set up
    #[error("Entry {entry} not ready: {reason}")]
    NotReady {
        /// Entry title or id
        entry: String,
        /// Cause of the failed first refresh
        reason: String,
        source: Box<ApplicationError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Wrap the cause of a failed backend call
    pub fn backend(source: impl Into<BoxError>) -> Self {
        Self::Backend(source.into())
    }
}
