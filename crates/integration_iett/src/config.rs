//! iett-middle client configuration

use serde::{Deserialize, Serialize};

/// Configuration for the iett-middle REST client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddleConfig {
    /// Base URL of the iett-middle backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total timeout for a feed request in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total timeout for the `/health` check in seconds
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_timeout_secs() -> u64 {
    20
}

const fn default_health_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    concat!("iett-feeds/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for MiddleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            health_timeout_secs: default_health_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl MiddleConfig {
    /// Default configuration pointed at another backend
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.health_timeout_secs == 0 {
            return Err("health_timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MiddleConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.health_timeout_secs, 5);
        assert!(config.user_agent.starts_with("iett-feeds/"));
    }

    #[test]
    fn test_with_base_url() {
        let config = MiddleConfig::with_base_url("http://iett-middle.test");
        assert_eq!(config.base_url, "http://iett-middle.test");
        assert_eq!(config.timeout_secs, 20);
    }

    #[test]
    fn test_validation_success() {
        assert!(MiddleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_base_url() {
        let config = MiddleConfig {
            base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeouts() {
        let config = MiddleConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MiddleConfig {
            health_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: MiddleConfig =
            serde_json::from_str(r#"{ "base_url": "http://iett-middle.test" }"#).unwrap();
        assert_eq!(config.base_url, "http://iett-middle.test");
        assert_eq!(config.timeout_secs, 20);
    }
}
