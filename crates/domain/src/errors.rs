//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Feed type key does not name a known feed
    #[error("Unknown feed type: {0}")]
    UnknownFeedType(String),

    /// A feed needs a parameter the entry does not carry
    #[error("Feed {feed_type} requires parameter {parameter}")]
    MissingParameter {
        feed_type: String,
        parameter: &'static str,
    },

    /// Route code is empty or malformed
    #[error("Invalid route code: {0}")]
    InvalidRouteCode(String),

    /// Stop code is empty or malformed
    #[error("Invalid stop code: {0}")]
    InvalidStopCode(String),

    /// A record violates one of its invariants
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a missing parameter error
    pub fn missing_parameter(feed_type: impl Into<String>, parameter: &'static str) -> Self {
        Self::MissingParameter {
            feed_type: feed_type.into(),
            parameter,
        }
    }
}
