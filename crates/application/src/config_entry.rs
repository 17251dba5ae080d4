//! Config entries
//!
//! A config entry is one user-configured feed: which backend to poll, which
//! feed, and the route or stop it is bound to. The host persists entries and
//! hands them to [`IntegrationSetup`](crate::services::IntegrationSetup).

use domain::{DomainError, FeedSelector};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default iett-middle backend
pub const DEFAULT_MIDDLE_URL: &str = "http://localhost:8000";

/// Raw values stored in a config entry
///
/// Field names match the persisted keys (`middle_url`, `feed_type`,
/// `hat_kodu`, `dcode`, `via`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryData {
    /// Base URL of the iett-middle backend
    #[serde(default = "default_middle_url")]
    pub middle_url: String,
    /// Feed type key, e.g. `route_fleet`
    pub feed_type: String,
    /// Route code for line-scoped feeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hat_kodu: Option<String>,
    /// Stop code for stop arrivals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dcode: Option<String>,
    /// Optional via-stop filter for stop arrivals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

fn default_middle_url() -> String {
    DEFAULT_MIDDLE_URL.to_string()
}

impl EntryData {
    /// Entry data for a feed without parameters
    pub fn new(middle_url: impl Into<String>, feed_type: impl Into<String>) -> Self {
        Self {
            middle_url: middle_url.into(),
            feed_type: feed_type.into(),
            hat_kodu: None,
            dcode: None,
            via: None,
        }
    }

    /// Bind a route code
    #[must_use]
    pub fn with_route(mut self, hat_kodu: impl Into<String>) -> Self {
        self.hat_kodu = Some(hat_kodu.into());
        self
    }

    /// Bind a stop code
    #[must_use]
    pub fn with_stop(mut self, dcode: impl Into<String>) -> Self {
        self.dcode = Some(dcode.into());
        self
    }

    /// Bind a via-stop filter
    #[must_use]
    pub fn with_via(mut self, via: impl Into<String>) -> Self {
        self.via = Some(via.into());
        self
    }

    /// Parse the stored values into a feed selector
    pub fn selector(&self) -> Result<FeedSelector, DomainError> {
        FeedSelector::from_parts(
            &self.feed_type,
            self.hat_kodu.as_deref(),
            self.dcode.as_deref(),
            self.via.as_deref(),
        )
    }
}

/// A configured feed instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Host-assigned identifier
    pub entry_id: String,
    /// Display title, also used as the sensor name
    pub title: String,
    /// Identity used for duplicate detection
    pub unique_id: Option<String>,
    /// Stored values
    pub data: EntryData,
}

impl ConfigEntry {
    /// Create an entry with a fresh id
    pub fn new(title: impl Into<String>, unique_id: Option<String>, data: EntryData) -> Self {
        Self {
            entry_id: Uuid::new_v4().to_string(),
            title: title.into(),
            unique_id,
            data,
        }
    }

    /// Create an entry titled and identified after its feed
    pub fn from_data(data: EntryData) -> Result<Self, DomainError> {
        let selector = data.selector()?;
        Ok(Self::new(selector.title(), Some(selector.unique_id()), data))
    }

    /// Keep a previously assigned entry id
    #[must_use]
    pub fn with_entry_id(mut self, entry_id: impl Into<String>) -> Self {
        self.entry_id = entry_id.into();
        self
    }
}
