//! Route code value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// An IETT line code such as `500T` or `14M` (the backend's `hat_kodu`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteCode(String);

impl RouteCode {
    /// Create a route code, trimming surrounding whitespace
    ///
    /// # Errors
    ///
    /// Returns `InvalidRouteCode` if the code is empty or contains whitespace.
    pub fn new(code: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidRouteCode(code.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the code as sent to the backend
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased form used for titles and unique ids
    pub fn normalized(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for RouteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RouteCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RouteCode> for String {
    fn from(code: RouteCode) -> Self {
        code.0
    }
}
