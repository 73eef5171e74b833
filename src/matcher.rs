//! # Ingredient Matching Module
//!
//! Finds watched ingredients in label text:
//!
//! 1. normalize the text and split it into tokens
//! 2. build 1..=N token windows at every token position
//! 3. fuzzy-search each window against the alias index
//! 4. drop candidates for disabled ingredients and candidates without any
//!    lexical overlap with their alias
//! 5. keep the best candidate per ingredient
//!
//! Matching never fails: empty or unusual text simply yields no matches.
//! Result order follows first discovery in the text and is not meant for
//! display; see [`crate::scan::sort_by_severity`].

use crate::alias_index::AliasIndex;
use crate::config::MatcherConfig;
use crate::fuzzy::FuzzyMatcher;
use crate::ingredient::{EnabledSet, Ingredient};
use crate::text_processing::{normalize, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// A watched ingredient found in the text, with the alias that matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedIngredient {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    /// Normalized alias that produced the match
    pub matched_alias: String,
    /// Normalized edit distance of the match (0.0 = exact)
    pub score: f64,
}

/// Matches plus counters describing the work done
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub matches: Vec<MatchedIngredient>,
    /// Windows sent to the fuzzy matcher
    pub windows_searched: usize,
    /// Fuzzy candidates dropped as disabled or lexically unrelated
    pub candidates_rejected: usize,
}

/// Build the phrase windows for a token sequence.
///
/// At every position the windows of 1, 2, ... `max_tokens` tokens starting
/// there are produced, stopping at the end of the text.
///
/// # Examples
/// ```
/// use clean_scan::matcher::phrase_windows;
///
/// let windows = phrase_windows(&["red", "40", "lake"], 2);
/// assert_eq!(windows, vec!["red", "red 40", "40", "40 lake", "lake"]);
/// ```
pub fn phrase_windows(tokens: &[&str], max_tokens: usize) -> Vec<String> {
    let mut windows = Vec::with_capacity(tokens.len() * max_tokens);
    for start in 0..tokens.len() {
        for width in 1..=max_tokens {
            let end = start + width;
            if end > tokens.len() {
                break;
            }
            windows.push(tokens[start..end].join(" "));
        }
    }
    windows
}

/// Word-boundary check for a fuzzy candidate.
///
/// Accepts an exact window/alias match, or any pair of words where the alias
/// word contains the window word or the other way round. Containment is
/// plain substring containment, so a short alias word such as "red" is
/// accepted inside "reddish".
///
/// # Examples
/// ```
/// use clean_scan::matcher::is_valid_match;
///
/// assert!(is_valid_match("msg", "msg"));
/// assert!(is_valid_match("sodium nitrate", "sodium nitrite"));
/// assert!(!is_valid_match("light", "bht"));
/// ```
pub fn is_valid_match(window: &str, alias: &str) -> bool {
    if window == alias {
        return true;
    }

    alias.split_whitespace().any(|alias_word| {
        window
            .split_whitespace()
            .any(|window_word| window_word.contains(alias_word) || alias_word.contains(window_word))
    })
}

/// Windowed fuzzy matcher over an alias index
#[derive(Debug, Clone)]
pub struct IngredientMatcher {
    fuzzy: FuzzyMatcher,
    max_window_tokens: usize,
}

impl Default for IngredientMatcher {
    fn default() -> Self {
        Self::new(&MatcherConfig::default())
    }
}

impl IngredientMatcher {
    pub fn new(config: &MatcherConfig) -> Self {
        Self {
            fuzzy: FuzzyMatcher::new(config),
            max_window_tokens: config.max_window_tokens,
        }
    }

    /// Find the enabled ingredients present in `text`
    pub fn find_matches(
        &self,
        text: &str,
        index: &AliasIndex,
        enabled: &EnabledSet,
    ) -> Vec<MatchedIngredient> {
        self.match_text(text, index, enabled).matches
    }

    /// Like [`find_matches`](Self::find_matches), also reporting work counters
    pub fn match_text(&self, text: &str, index: &AliasIndex, enabled: &EnabledSet) -> MatchOutcome {
        let normalized = normalize(text);
        let tokens = tokenize(&normalized);
        let mut outcome = MatchOutcome::default();
        // ingredient id -> (position in outcome.matches, alias token count)
        let mut found: HashMap<String, (usize, usize)> = HashMap::new();

        for window in phrase_windows(&tokens, self.max_window_tokens) {
            if window.chars().count() < self.fuzzy.min_match_chars() {
                continue;
            }
            outcome.windows_searched += 1;

            for candidate in self.fuzzy.search(&window, index) {
                let entry = candidate.entry;

                if !enabled.contains(&entry.ingredient_id) {
                    outcome.candidates_rejected += 1;
                    continue;
                }

                if !is_valid_match(&window, &entry.alias) {
                    trace!(
                        window = %window,
                        alias = %entry.alias,
                        "Rejected candidate without word overlap"
                    );
                    outcome.candidates_rejected += 1;
                    continue;
                }

                let ingredient = match index.ingredient(&entry.ingredient_id) {
                    Some(ingredient) => ingredient,
                    None => continue,
                };

                match found.get_mut(&entry.ingredient_id) {
                    Some((position, token_count)) => {
                        let current = &mut outcome.matches[*position];
                        let closer = candidate.score < current.score;
                        let longer = candidate.score == current.score
                            && entry.token_count > *token_count;
                        if closer || longer {
                            current.matched_alias = entry.alias.clone();
                            current.score = candidate.score;
                            *token_count = entry.token_count;
                        }
                    }
                    None => {
                        debug!(
                            ingredient_id = %entry.ingredient_id,
                            window = %window,
                            alias = %entry.alias,
                            score = candidate.score,
                            "Ingredient matched"
                        );
                        found.insert(
                            entry.ingredient_id.clone(),
                            (outcome.matches.len(), entry.token_count),
                        );
                        outcome.matches.push(MatchedIngredient {
                            ingredient: ingredient.clone(),
                            matched_alias: entry.alias.clone(),
                            score: candidate.score,
                        });
                    }
                }
            }
        }

        debug!(
            tokens = tokens.len(),
            windows = outcome.windows_searched,
            matches = outcome.matches.len(),
            rejected = outcome.candidates_rejected,
            "Matching finished"
        );
        outcome
    }
}

/// Find enabled ingredients in `text` with the default matcher settings
pub fn find_ingredients_in_text(
    text: &str,
    index: &AliasIndex,
    enabled: &EnabledSet,
) -> Vec<MatchedIngredient> {
    IngredientMatcher::default().find_matches(text, index, enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_windows_bounded_at_text_end() {
        let windows = phrase_windows(&["a", "b", "c"], 3);
        assert_eq!(windows, vec!["a", "a b", "a b c", "b", "b c", "c"]);
        assert!(phrase_windows(&[], 3).is_empty());
    }

    #[test]
    fn test_is_valid_match_containment_both_ways() {
        assert!(is_valid_match("nitrites", "nitrite"));
        assert!(is_valid_match("glutamat", "monosodium glutamate"));
        // Accepted trade-off: short alias words inside longer window words
        assert!(is_valid_match("reddish", "red 40"));
        assert!(is_valid_match("bhtx", "bht"));
        assert!(!is_valid_match("bread", "red 40"));
        assert!(!is_valid_match("sucrose", "sucralose"));
    }
}
