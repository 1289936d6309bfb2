//! Configuration management for Medquiry
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files and environment variables.

use crate::error::{MedquiryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Medquiry
///
/// Holds everything the client needs: where the inquiry service lives,
/// how to authenticate against it, and where session history is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Inquiry API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Local session storage settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// Inquiry API configuration
///
/// Base URL and auth token for the remote inquiry service. The token is
/// sent with every request in the `X-Token` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the inquiry service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Auth token carried in the X-Token header
    #[serde(default = "default_token")]
    pub token: String,

    /// Request timeout ceiling in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_token() -> String {
    "zl".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: default_token(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Local session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Directory for the session database; when unset the platform
    /// data directory is used
    #[serde(default)]
    pub dir: Option<std::path::PathBuf>,
}

impl Config {
    /// Load configuration from a file with environment overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use medquiry::Config;
    ///
    /// let config = Config::load("config/config.yaml").unwrap();
    /// config.validate().unwrap();
    /// ```
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MedquiryError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MedquiryError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("MEDQUIRY_API_BASE_URL") {
            self.api.base_url = base_url.clone();
            tracing::debug!(base_url = %base_url, "Env override: MEDQUIRY_API_BASE_URL");
        }

        if let Ok(token) = std::env::var("MEDQUIRY_API_TOKEN") {
            self.api.token = token;
            tracing::debug!("Env override: MEDQUIRY_API_TOKEN");
        }

        if let Ok(timeout) = std::env::var("MEDQUIRY_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => {
                    self.api.timeout_seconds = v;
                    tracing::debug!(timeout_seconds = v, "Env override: MEDQUIRY_TIMEOUT_SECONDS");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for MEDQUIRY_TIMEOUT_SECONDS: {}", timeout);
                }
            }
        }

        if let Ok(dir) = std::env::var("MEDQUIRY_STORE_DIR") {
            self.store.dir = Some(std::path::PathBuf::from(dir.clone()));
            tracing::debug!(dir = %dir, "Env override: MEDQUIRY_STORE_DIR");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `MedquiryError::Config` if any field holds an unusable value
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(MedquiryError::Config("api.base_url cannot be empty".to_string()).into());
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(MedquiryError::Config(format!(
                "api.base_url must start with http:// or https://, got: {}",
                self.api.base_url
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(
                MedquiryError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.store.dir.is_none());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let mut config = Config::default();
        config.api.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_yaml_uses_defaults() {
        let yaml = "api:\n  base_url: https://inquiry.example.com\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://inquiry.example.com");
        assert_eq!(config.api.token, "zl");
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn test_parse_store_dir() {
        let yaml = "store:\n  dir: /tmp/medquiry-test\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.store.dir,
            Some(std::path::PathBuf::from("/tmp/medquiry-test"))
        );
    }
}
