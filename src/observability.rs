//! Observability module for logging setup and metrics recording.
//!
//! This module provides:
//! - Structured logging with configurable levels (pretty or JSON output)
//! - Metrics recording through the `metrics` facade; installing a recorder
//!   and exporter is left to the embedding application

use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("clean_scan={}", config.log_level.to_lowercase()).parse()?);

    if config.use_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        log_format = %config.log_format,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Record metrics for one completed scan
pub fn record_scan_metrics(found: usize, duration: Duration, windows: usize) {
    metrics::counter!("scans_total", "result" => if found > 0 { "harmful" } else { "clean" })
        .increment(1);
    metrics::histogram!("scan_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("scan_windows").record(windows as f64);
    metrics::histogram!("scan_ingredients_found").record(found as f64);
}

/// Record metrics for an alias index rebuild
pub fn record_index_rebuild(entries: usize, duration: Duration) {
    metrics::counter!("alias_index_rebuilds_total").increment(1);
    metrics::gauge!("alias_index_entries").set(entries as f64);
    metrics::histogram!("alias_index_build_seconds").record(duration.as_secs_f64());
}

/// Record a failed fetch from an OCR / lookup text source
pub fn record_source_failure(reason: &'static str) {
    metrics::counter!("text_source_failures_total", "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_without_recorder_are_noops() {
        record_scan_metrics(2, Duration::from_millis(3), 12);
        record_index_rebuild(40, Duration::from_micros(150));
        record_source_failure("timeout");
    }
}
