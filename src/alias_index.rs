//! # Alias Index Module
//!
//! Maps every normalized alias of every watched ingredient back to its
//! ingredient. The index is immutable: when the ingredient collection changes
//! callers build a new one and replace the old one wholesale.

use crate::errors::{error_logging, AppError, AppResult};
use crate::ingredient::Ingredient;
use crate::text_processing::normalize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};

/// One (normalized alias, ingredient id) pair
#[derive(Debug, Clone, PartialEq)]
pub struct AliasEntry {
    /// Alias after `normalize`
    pub alias: String,
    pub ingredient_id: String,
    /// Number of whitespace-delimited words in the alias
    pub token_count: usize,
    /// Alias length in characters
    pub char_count: usize,
}

/// Searchable alias structure for one ingredient collection
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    entries: Vec<AliasEntry>,
    ingredients: HashMap<String, Ingredient>,
}

impl AliasIndex {
    /// Build an index from a complete ingredient collection.
    ///
    /// Fails with [`AppError::Catalog`] if any ingredient has no aliases,
    /// since such an ingredient could never be matched. Aliases that
    /// normalize to nothing (pure punctuation, emoji) are skipped.
    pub fn build(ingredients: &[Ingredient]) -> AppResult<Self> {
        let start = Instant::now();
        let mut entries = Vec::new();
        let mut records = HashMap::with_capacity(ingredients.len());

        for ingredient in ingredients {
            if ingredient.aliases.is_empty() {
                let err = AppError::Catalog(format!(
                    "Ingredient '{}' has no aliases and can never be matched",
                    ingredient.id
                ));
                error_logging::log_catalog_error(
                    &err,
                    "build_alias_index",
                    Some(&ingredient.id),
                    Some(ingredients.len()),
                );
                return Err(err);
            }

            for alias in &ingredient.aliases {
                let normalized = normalize(alias);
                if normalized.is_empty() {
                    warn!(
                        ingredient_id = %ingredient.id,
                        alias = %alias,
                        "Skipping alias that normalizes to empty text"
                    );
                    continue;
                }

                entries.push(AliasEntry {
                    token_count: normalized.split(' ').count(),
                    char_count: normalized.chars().count(),
                    alias: normalized,
                    ingredient_id: ingredient.id.clone(),
                });
            }

            records
                .entry(ingredient.id.clone())
                .or_insert_with(|| ingredient.clone());
        }

        let duration = start.elapsed();
        info!(
            ingredients = records.len(),
            entries = entries.len(),
            duration_us = duration.as_micros() as u64,
            "Alias index built"
        );
        crate::observability::record_index_rebuild(entries.len(), duration);

        Ok(Self {
            entries,
            ingredients: records,
        })
    }

    /// All alias entries in catalog order
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    /// The ingredient record behind an id
    pub fn ingredient(&self, id: &str) -> Option<&Ingredient> {
        self.ingredients.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
