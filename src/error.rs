//! Error types for Toolboxx Assist
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Toolboxx Assist operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, backend API calls, authentication, and
/// local session storage.
#[derive(Error, Debug)]
pub enum AssistError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend API errors (non-success responses, malformed payloads)
    #[error("API error: {0}")]
    Api(String),

    /// Authentication errors (login/register rejections, 401 on protected calls)
    ///
    /// The contained message is the server-supplied `detail` when one was
    /// present in the response body.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Input validation errors, caught before any network call is made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Session storage errors (key-value store operations)
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

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Toolboxx Assist operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = AssistError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_api_error_display() {
        let error = AssistError::Api("backend returned 500".to_string());
        assert_eq!(error.to_string(), "API error: backend returned 500");
    }

    #[test]
    fn test_authentication_error_display() {
        let error = AssistError::Authentication("Invalid credentials".to_string());
        assert_eq!(
            error.to_string(),
            "Authentication error: Invalid credentials"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let error = AssistError::Validation("Please fill in all fields".to_string());
        assert_eq!(
            error.to_string(),
            "Validation error: Please fill in all fields"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let error = AssistError::Storage("database unavailable".to_string());
        assert_eq!(error.to_string(), "Storage error: database unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AssistError = io_error.into();
        assert!(matches!(error, AssistError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: AssistError = json_error.into();
        assert!(matches!(error, AssistError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: AssistError = yaml_error.into();
        assert!(matches!(error, AssistError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AssistError>();
    }
}
