//! # Scan Results Module
//!
//! Immutable per-scan results, a bounded newest-first scan history, and the
//! severity ordering used when presenting findings.

use crate::matcher::MatchedIngredient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Disambiguates scans completed within the same millisecond
static SCAN_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Outcome of one completed scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// `<millis>-<sequence>`, unique within the process
    pub id: String,
    /// Ingredients text the matcher ran on
    pub extracted_text: String,
    pub found_ingredients: Vec<MatchedIngredient>,
    pub is_harmful: bool,
    pub timestamp: DateTime<Utc>,
}

impl ScanResult {
    pub fn new(extracted_text: String, found_ingredients: Vec<MatchedIngredient>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!(
                "{}-{}",
                timestamp.timestamp_millis(),
                SCAN_SEQUENCE.fetch_add(1, Ordering::Relaxed)
            ),
            is_harmful: !found_ingredients.is_empty(),
            extracted_text,
            found_ingredients,
            timestamp,
        }
    }
}

/// Order findings for display: High > Medium > Low, then by name
pub fn sort_by_severity(matches: &mut [MatchedIngredient]) {
    matches.sort_by(|a, b| {
        b.ingredient
            .severity
            .rank()
            .cmp(&a.ingredient.severity.rank())
            .then_with(|| a.ingredient.name.cmp(&b.ingredient.name))
    });
}

/// Most recent scans, newest first, capped at `limit` entries
#[derive(Debug, Clone)]
pub struct ScanHistory {
    entries: VecDeque<ScanResult>,
    limit: usize,
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::new(50)
    }
}

impl ScanHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(64)),
            limit: limit.max(1),
        }
    }

    /// Record a scan, dropping the oldest one when full
    pub fn record(&mut self, result: ScanResult) {
        self.entries.push_front(result);
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScanResult> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ScanResult> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
