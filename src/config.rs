//! Configuration management for Toolboxx Assist
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AssistError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Main configuration structure for Toolboxx Assist
///
/// This structure holds all configuration needed by the client,
/// including the backend API location and chat behavior settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Chat behavior configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend API, including the version prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Greeting message rendered once per session when the chat opens
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Maximum number of words used when generating a conversation title
    /// from the first message
    #[serde(default = "default_title_max_words")]
    pub title_max_words: usize,
}

fn default_greeting() -> String {
    "Hello! I am your Trust Inheritance Legal AI Assistant, How can I help you today!".to_string()
}

fn default_title_max_words() -> usize {
    8
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            title_max_words: default_title_max_words(),
        }
    }
}

impl Config {
    /// Load configuration from a file with environment and CLI overrides
    ///
    /// Falls back to defaults with a warning when the file does not exist.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command-line arguments whose overrides take
    ///   precedence over both the file and the environment
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Parse configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AssistError::Config(format!("Failed to read {}: {}", path, e)))?;
        let config: Self = serde_yaml::from_str(&contents)
            .map_err(|e| AssistError::Config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("TOOLBOXX_API_BASE") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("TOOLBOXX_API_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) => self.api.timeout_seconds = value,
                Err(_) => {
                    tracing::warn!("Ignoring invalid TOOLBOXX_API_TIMEOUT_SECONDS: {}", timeout)
                }
            }
        }
    }

    /// Apply command-line overrides
    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_base) = &cli.api_base {
            self.api.base_url = api_base.clone();
        }
    }

    /// Validate the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns `AssistError::Config` when the base URL does not parse or
    /// numeric settings are out of range.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url)
            .map_err(|e| AssistError::Config(format!("Invalid api.base_url: {}", e)))?;

        if self.api.timeout_seconds == 0 {
            return Err(AssistError::Config(
                "api.timeout_seconds must be greater than zero".to_string(),
            )
            .into());
        }

        if self.chat.title_max_words == 0 {
            return Err(AssistError::Config(
                "chat.title_max_words must be greater than zero".to_string(),
            )
            .into());
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
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.chat.title_max_words, 8);
    }

    #[test]
    fn test_default_greeting_text() {
        let config = Config::default();
        assert!(config.chat.greeting.contains("Legal AI Assistant"));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_title_words() {
        let mut config = Config::default();
        config.chat.title_max_words = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_partial_file_uses_defaults() {
        let yaml = "api:\n  base_url: \"https://example.test/api/v1\"\n";
        let config: Config = serde_yaml::from_str(yaml).expect("parse failed");
        assert_eq!(config.api.base_url, "https://example.test/api/v1");
        // Unspecified sections fall back to defaults
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.chat.title_max_words, 8);
    }

    #[test]
    fn test_from_yaml_empty_document() {
        let config: Config = serde_yaml::from_str("{}").expect("parse failed");
        assert!(config.validate().is_ok());
    }
}
