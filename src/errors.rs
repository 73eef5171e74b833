//! # Application Error Types
//!
//! This module defines common error types used throughout CleanScan.
//! The matching pipeline itself never fails on text input; these errors cover
//! catalog authoring mistakes, configuration, external text sources and
//! preference storage.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Validation errors (custom ingredient names, inputs, etc.)
    Validation(String),
    /// Ingredient catalog and alias index construction errors
    Catalog(String),
    /// OCR / product lookup text source errors
    Source(String),
    /// Preference storage errors
    Storage(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Catalog(msg) => write!(f, "[CATALOG] {}", msg),
            AppError::Source(msg) => write!(f, "[SOURCE] {}", msg),
            AppError::Storage(msg) => write!(f, "[STORAGE] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Catalog(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Source(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log catalog or index construction errors with the offending ingredient
    pub fn log_catalog_error(
        error: &impl std::fmt::Display,
        operation: &str,
        ingredient_id: Option<&str>,
        ingredient_count: Option<usize>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            ingredient_id = ?ingredient_id,
            ingredient_count = ?ingredient_count,
            "Ingredient catalog operation failed"
        );
    }

    /// Log text source errors (OCR, product lookup) with timing context
    pub fn log_source_error(
        error: &impl std::fmt::Display,
        operation: &str,
        processing_duration: Option<std::time::Duration>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            processing_duration_ms = ?processing_duration.map(|d| d.as_millis()),
            "Text source operation failed"
        );
    }

    /// Log preference storage errors
    pub fn log_storage_error(error: &impl std::fmt::Display, operation: &str) {
        error!(
            error = %error,
            operation = %operation,
            "Preference storage operation failed"
        );
    }

    /// Log validation errors with input context
    pub fn log_validation_error(
        error: &impl std::fmt::Display,
        operation: &str,
        input_type: &str,
        input_value: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            input_type = %input_type,
            input_value = ?input_value.map(|v| v.chars().take(100).collect::<String>()),
            "Validation failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            AppError::Catalog("no aliases".to_string()).to_string(),
            "[CATALOG] no aliases"
        );
        assert_eq!(
            AppError::Source("timed out".to_string()).to_string(),
            "[SOURCE] timed out"
        );
    }

    #[test]
    fn test_json_errors_map_to_catalog() {
        let err: AppError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert!(matches!(err, AppError::Catalog(_)));
    }
}
