//! Betax backend configuration

use serde::{Deserialize, Serialize};
use url::Url;

/// Connection settings for the Betax backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetaxConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds; unset means no timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:3000/radarbus".to_string()
}

fn default_user_agent() -> String {
    format!("betax-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for BetaxConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl BetaxConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: Some(5),
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL or the
    /// timeout is zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        let url = Url::parse(&self.base_url).map_err(|e| format!("base_url is invalid: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err("base_url must use http or https".to_string());
        }

        if self.timeout_secs == Some(0) {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BetaxConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000/radarbus");
        assert!(config.timeout_secs.is_none());
        assert!(config.user_agent.starts_with("betax-client/"));
    }

    #[test]
    fn test_testing_config() {
        assert_eq!(BetaxConfig::for_testing().timeout_secs, Some(5));
    }

    #[test]
    fn test_validation_success() {
        assert!(BetaxConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_base_url() {
        let config = BetaxConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_other_schemes() {
        let config = BetaxConfig {
            base_url: "ftp://example.com/radarbus".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = BetaxConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: BetaxConfig =
            serde_json::from_str(r#"{ "base_url": "http://10.0.0.2:3000/radarbus" }"#).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:3000/radarbus");
        assert!(config.timeout_secs.is_none());
    }
}
