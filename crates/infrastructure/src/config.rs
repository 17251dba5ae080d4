//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `IETT_*` environment variables (`__` separates nested keys,
//! e.g. `IETT_MIDDLE__BASE_URL`). Configured feeds live in `[[entries]]`.

use std::collections::HashSet;
use std::path::Path;

use application::{ConfigEntry, EntryData};
use domain::DomainError;
use integration_iett::MiddleConfig;
use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerConfig;
use crate::telemetry::TelemetryConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend client settings; `base_url` is the default for entries
    #[serde(default)]
    pub middle: MiddleConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Feed scheduler configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Configured feeds
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

/// One `[[entries]]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Stable entry id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,

    /// Title override; derived from the feed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Backend URL; falls back to `middle.base_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_url: Option<String>,

    pub feed_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hat_kodu: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dcode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

impl EntryConfig {
    /// Build the config entry, resolving the backend URL against `default_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the feed type is unknown or a parameter is missing.
    pub fn to_entry(&self, default_url: &str) -> Result<ConfigEntry, DomainError> {
        let data = EntryData {
            middle_url: self
                .middle_url
                .clone()
                .unwrap_or_else(|| default_url.to_string()),
            feed_type: self.feed_type.clone(),
            hat_kodu: self.hat_kodu.clone(),
            dcode: self.dcode.clone(),
            via: self.via.clone(),
        };

        let mut entry = ConfigEntry::from_data(data)?;
        if let Some(title) = &self.title {
            entry.title.clone_from(title);
        }
        Ok(match &self.entry_id {
            Some(entry_id) => entry.with_entry_id(entry_id.as_str()),
            None => entry,
        })
    }

    /// Render as an `[[entries]]` block for `config.toml`
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        #[derive(Serialize)]
        struct Document<'a> {
            entries: [&'a EntryConfig; 1],
        }

        toml::to_string(&Document { entries: [self] })
    }
}

impl From<&ConfigEntry> for EntryConfig {
    fn from(entry: &ConfigEntry) -> Self {
        Self {
            entry_id: Some(entry.entry_id.clone()),
            title: Some(entry.title.clone()),
            middle_url: Some(entry.data.middle_url.clone()),
            feed_type: entry.data.feed_type.clone(),
            hat_kodu: entry.data.hat_kodu.clone(),
            dcode: entry.data.dcode.clone(),
            via: entry.data.via.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.toml` (or `path`) and the environment
    ///
    /// A missing default file is fine; an explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = path.map_or_else(
            || config::File::with_name("config").required(false),
            |path| config::File::from(path).required(true),
        );

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("middle.base_url", application::DEFAULT_MIDDLE_URL)?
            .set_default("telemetry.log_filter", "info")?
            // Load from file if exists
            .add_source(file)
            // Override with environment variables (e.g., IETT_MIDDLE__TIMEOUT_SECS)
            .add_source(
                config::Environment::with_prefix("IETT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Resolve every `[[entries]]` table
    ///
    /// # Errors
    ///
    /// Returns the first entry that cannot be resolved.
    pub fn config_entries(&self) -> Result<Vec<ConfigEntry>, DomainError> {
        self.entries
            .iter()
            .map(|entry| entry.to_entry(&self.middle.base_url))
            .collect()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.middle.validate()?;
        self.scheduler.validate()?;

        let mut ids = HashSet::new();
        for id in self.entries.iter().filter_map(|e| e.entry_id.as_deref()) {
            if !ids.insert(id) {
                return Err(format!("duplicate entry_id {id}"));
            }
        }

        Ok(())
    }
}
