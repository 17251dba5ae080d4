//! Stop code value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// An IETT stop code such as `220602` (the backend's `dcode`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopCode(String);

impl StopCode {
    /// Create a stop code, trimming surrounding whitespace
    ///
    /// # Errors
    ///
    /// Returns `InvalidStopCode` if the code is empty or contains whitespace.
    pub fn new(code: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = code.as_ref().trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidStopCode(code.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the code as sent to the backend
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StopCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StopCode> for String {
    fn from(code: StopCode) -> Self {
        code.0
    }
}
