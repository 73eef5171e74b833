//! # Unified Application Configuration
//!
//! This module consolidates the matcher, scan and observability settings into
//! a single configuration object. It supports loading from environment
//! variables and validates every section before use.

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Fuzzy matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Maximum normalized edit distance (errors / alias length) for a candidate
    pub fuzzy_threshold: f64,
    /// Windows and aliases shorter than this many characters are never compared
    pub min_match_chars: usize,
    /// Widest phrase window, in tokens, generated at each token position
    pub max_window_tokens: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.3,
            min_match_chars: 3,
            max_window_tokens: 3,
        }
    }
}

impl MatcherConfig {
    /// Validate matcher configuration
    pub fn validate(&self) -> AppResult<()> {
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(AppError::Config(format!(
                "fuzzy_threshold must be in (0, 1], got {}",
                self.fuzzy_threshold
            )));
        }

        if self.min_match_chars == 0 {
            return Err(AppError::Config(
                "min_match_chars must be greater than 0".to_string(),
            ));
        }

        if self.max_window_tokens == 0 || self.max_window_tokens > 5 {
            return Err(AppError::Config(format!(
                "max_window_tokens must be between 1 and 5, got {}",
                self.max_window_tokens
            )));
        }

        Ok(())
    }
}

/// Scan session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// How long to wait for an OCR / lookup text source
    pub source_timeout_secs: u64,
    /// Number of scan results kept in the session history
    pub history_limit: usize,
    /// Optional JSON file replacing the embedded built-in catalog
    pub catalog_path: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            source_timeout_secs: 30,
            history_limit: 50,
            catalog_path: None,
        }
    }
}

impl ScanConfig {
    /// Validate scan configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.source_timeout_secs == 0 {
            return Err(AppError::Config("Source timeout cannot be 0".to_string()));
        }

        if self.source_timeout_secs > 300 {
            return Err(AppError::Config(
                "Source timeout cannot be greater than 300 seconds".to_string(),
            ));
        }

        if self.history_limit == 0 {
            return Err(AppError::Config("History limit cannot be 0".to_string()));
        }

        if let Some(path) = &self.catalog_path {
            if path.as_os_str().is_empty() {
                return Err(AppError::Config(
                    "Catalog path cannot be empty if provided".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Fuzzy matcher configuration
    pub matcher: MatcherConfig,
    /// Scan session configuration
    pub scan: ScanConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
}

/// Parse an optional numeric environment variable, falling back to `default`
fn env_number<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a valid number", key))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        config.matcher.fuzzy_threshold =
            env_number("MATCH_THRESHOLD", config.matcher.fuzzy_threshold)?;
        config.matcher.min_match_chars =
            env_number("MIN_MATCH_CHARS", config.matcher.min_match_chars)?;
        config.matcher.max_window_tokens =
            env_number("MAX_WINDOW_TOKENS", config.matcher.max_window_tokens)?;

        config.scan.source_timeout_secs =
            env_number("SCAN_SOURCE_TIMEOUT_SECS", config.scan.source_timeout_secs)?;
        config.scan.history_limit = env_number("SCAN_HISTORY_LIMIT", config.scan.history_limit)?;
        config.scan.catalog_path = env::var("CATALOG_PATH").ok().map(PathBuf::from);

        config.observability = ObservabilityConfig::from_env();

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.matcher.validate()?;
        self.scan.validate()?;
        self.observability.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: threshold={}, min_chars={}, window_tokens={}, source_timeout={}s, history_limit={}, catalog={}, environment={}",
            self.matcher.fuzzy_threshold,
            self.matcher.min_match_chars,
            self.matcher.max_window_tokens,
            self.scan.source_timeout_secs,
            self.scan.history_limit,
            self.scan
                .catalog_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string()),
            self.observability.environment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.summary().contains("catalog=built-in"));
    }

    #[test]
    fn test_matcher_config_validation() {
        let mut config = MatcherConfig::default();
        assert!(config.validate().is_ok());

        config.fuzzy_threshold = 0.0;
        assert!(config.validate().is_err());
        config.fuzzy_threshold = 1.5;
        assert!(config.validate().is_err());
        config.fuzzy_threshold = 0.3;

        config.min_match_chars = 0;
        assert!(config.validate().is_err());
        config.min_match_chars = 3;

        config.max_window_tokens = 0;
        assert!(config.validate().is_err());
        config.max_window_tokens = 6;
        assert!(config.validate().is_err());
        config.max_window_tokens = 3;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scan_config_validation() {
        let mut config = ScanConfig::default();
        assert!(config.validate().is_ok());

        config.source_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.source_timeout_secs = 301;
        assert!(config.validate().is_err());
        config.source_timeout_secs = 30;

        config.history_limit = 0;
        assert!(config.validate().is_err());
        config.history_limit = 50;

        config.catalog_path = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }
}
