//! # Fuzzy Matcher Module
//!
//! Approximate comparison of a short query window against every alias in an
//! [`AliasIndex`]. Scores are normalized edit distances: the Levenshtein
//! distance between window and alias divided by the alias length, so `0.0`
//! is an exact match and lower is closer.
//!
//! The comparison covers the whole alias, so insertions, deletions and
//! substitutions are tolerated at any position. Windows and aliases shorter
//! than the configured minimum length are never compared.

use crate::alias_index::{AliasEntry, AliasIndex};
use crate::config::MatcherConfig;
use tracing::trace;

/// A fuzzy hit for one alias entry
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyCandidate<'a> {
    pub entry: &'a AliasEntry,
    /// Normalized edit distance, in `[0, threshold]`
    pub score: f64,
}

/// Edit-distance matcher with a fixed strictness threshold
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    threshold: f64,
    min_match_chars: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(&MatcherConfig::default())
    }
}

impl FuzzyMatcher {
    pub fn new(config: &MatcherConfig) -> Self {
        Self {
            threshold: config.fuzzy_threshold,
            min_match_chars: config.min_match_chars,
        }
    }

    pub fn min_match_chars(&self) -> usize {
        self.min_match_chars
    }

    /// Largest edit distance accepted for an alias of `alias_chars` characters
    fn max_edits(&self, alias_chars: usize) -> usize {
        (self.threshold * alias_chars as f64 + 1e-9).floor() as usize
    }

    /// Find every alias within the threshold of `window`, closest first
    pub fn search<'a>(&self, window: &str, index: &'a AliasIndex) -> Vec<FuzzyCandidate<'a>> {
        let window_chars: Vec<char> = window.chars().collect();
        if window_chars.len() < self.min_match_chars {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for entry in index.entries() {
            if entry.char_count < self.min_match_chars {
                continue;
            }

            let max_edits = self.max_edits(entry.char_count);
            // The length difference alone needs that many insertions or deletions
            if window_chars.len().abs_diff(entry.char_count) > max_edits {
                continue;
            }

            let alias_chars: Vec<char> = entry.alias.chars().collect();
            if let Some(distance) = bounded_levenshtein(&window_chars, &alias_chars, max_edits) {
                let score = distance as f64 / entry.char_count as f64;
                trace!(
                    window = %window,
                    alias = %entry.alias,
                    distance,
                    score,
                    "Fuzzy candidate"
                );
                candidates.push(FuzzyCandidate { entry, score });
            }
        }

        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
        candidates
    }
}

/// Levenshtein distance between two strings, counted in characters
///
/// # Examples
/// ```
/// use clean_scan::fuzzy::levenshtein_distance;
///
/// assert_eq!(levenshtein_distance("contalns", "contains"), 1);
/// assert_eq!(levenshtein_distance("", "msg"), 3);
/// ```
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    bounded_levenshtein(&s1_chars, &s2_chars, usize::MAX).unwrap_or(usize::MAX)
}

/// Levenshtein distance, or `None` as soon as it must exceed `max_distance`.
///
/// Keeps two rows of the edit matrix. Every cell of the final answer's path
/// passes through each row, so a row whose minimum is already above the bound
/// ends the computation early.
fn bounded_levenshtein(s1: &[char], s2: &[char], max_distance: usize) -> Option<usize> {
    let mut previous: Vec<usize> = (0..=s2.len()).collect();
    let mut current = vec![0; s2.len() + 1];

    for (i, c1) in s1.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];

        for (j, c2) in s2.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
            row_min = row_min.min(current[j + 1]);
        }

        if row_min > max_distance {
            return None;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    let distance = previous[s2.len()];
    (distance <= max_distance).then_some(distance)
}
