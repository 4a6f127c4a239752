//! Configuration management for Sonia
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SoniaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Sonia
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Assistant service connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Interactive chat settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Assistant service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base origin of the assistant service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional request timeout in seconds
    ///
    /// Unset by default: requests wait for the service however long it
    /// takes to parse and embed a document.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_user_agent() -> String {
    format!("sonia/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Name the assistant is shown under
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Print message timestamps in the transcript
    #[serde(default)]
    pub show_timestamps: bool,
}

fn default_assistant_name() -> String {
    "Sonia".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            show_timestamps: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,

    /// Also append log lines to this file
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
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

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SoniaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SoniaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("SONIA_API_BASE") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("SONIA_API_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) => self.api.timeout_seconds = Some(value),
                Err(_) => tracing::warn!("Invalid SONIA_API_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(name) = std::env::var("SONIA_ASSISTANT_NAME") {
            self.chat.assistant_name = name;
        }

        if let Ok(level) = std::env::var("SONIA_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(json_logs) = std::env::var("SONIA_LOG_JSON") {
            match json_logs.parse::<bool>() {
                Ok(v) => self.logging.json = v,
                Err(_) => tracing::warn!("Invalid value for SONIA_LOG_JSON: {}", json_logs),
            }
        }

        if let Ok(log_file) = std::env::var("SONIA_LOG_FILE") {
            self.logging.file_path = Some(PathBuf::from(log_file));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base) = &cli.api_base {
            tracing::debug!("Using API base override from CLI: {}", base);
            self.api.base_url = base.clone();
        }
        if cli.verbose {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`SoniaError::Config`] if the base URL is not an absolute
    /// http(s) URL, the timeout is zero, or the log level is blank
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| {
            SoniaError::Config(format!(
                "api.base_url is not a valid URL ({}): {}",
                self.api.base_url, e
            ))
        })?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(SoniaError::Config(format!(
                "api.base_url must use http or https, got: {}",
                base.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == Some(0) {
            return Err(SoniaError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.assistant_name.trim().is_empty() {
            return Err(
                SoniaError::Config("chat.assistant_name cannot be empty".to_string()).into(),
            );
        }

        if self.logging.level.trim().is_empty() {
            return Err(SoniaError::Config("logging.level cannot be empty".to_string()).into());
        }

        Ok(())
    }
}
