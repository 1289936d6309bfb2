//! Error types for Medquiry
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Medquiry operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, inquiry API calls, and session storage.
#[derive(Error, Debug)]
pub enum MedquiryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inquiry API errors (unexpected payloads, upload failures, etc.)
    #[error("API error: {0}")]
    Api(String),

    /// Session storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors (transport failures, timeouts, non-2xx statuses)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Medquiry operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = MedquiryError::Config("missing base URL".to_string());
        assert_eq!(error.to_string(), "Configuration error: missing base URL");
    }

    #[test]
    fn test_api_error_display() {
        let error = MedquiryError::Api("empty question".to_string());
        assert_eq!(error.to_string(), "API error: empty question");
    }

    #[test]
    fn test_storage_error_display() {
        let error = MedquiryError::Storage("database flush failed".to_string());
        assert_eq!(error.to_string(), "Storage error: database flush failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: MedquiryError = io_error.into();
        assert!(matches!(error, MedquiryError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: MedquiryError = json_error.into();
        assert!(matches!(error, MedquiryError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: MedquiryError = yaml_error.into();
        assert!(matches!(error, MedquiryError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MedquiryError>();
    }
}
