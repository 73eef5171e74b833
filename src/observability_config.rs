//! # Observability Configuration
//!
//! Environment-specific configuration for logging output.

use std::env;

use crate::errors::{AppError, AppResult};

/// Observability configuration for different environments
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Log level for the crate's own targets
    pub log_level: String,
    /// Log output format ("pretty" or "json")
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let default_format = if environment == "development" {
            "pretty"
        } else {
            "json"
        };
        Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| default_format.to_string()),
            environment,
        }
    }

    /// Whether log lines should be emitted as JSON
    pub fn use_json(&self) -> bool {
        self.log_format == "json"
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Invalid log level: {}",
                self.log_level
            )));
        }

        if self.log_format != "pretty" && self.log_format != "json" {
            return Err(AppError::Config(format!(
                "Invalid log format: {} (expected 'pretty' or 'json')",
                self.log_format
            )));
        }

        Ok(())
    }
}
