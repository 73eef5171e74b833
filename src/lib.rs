//! # CleanScan
//!
//! Flags ingredients from a personal avoid list in scanned or typed product
//! label text. The core is a synchronous matching engine: extract the
//! ingredients section, normalize it, slide 1..=3 token windows over it and
//! fuzzy-match each window against an index of ingredient aliases.
//!
//! OCR, product lookup and preference persistence are supplied by the caller
//! through [`source::TextSource`] and [`preferences::PreferenceStore`].

pub mod alias_index;
pub mod config;
pub mod errors;
pub mod fuzzy;
pub mod ingredient;
pub mod matcher;
pub mod observability;
pub mod observability_config;
pub mod preferences;
pub mod scan;
pub mod scanner;
pub mod source;
pub mod text_processing;

// Re-export types for easier access
pub use alias_index::AliasIndex;
pub use ingredient::{EnabledSet, Ingredient, Severity};
pub use matcher::{find_ingredients_in_text, IngredientMatcher, MatchedIngredient};
pub use scanner::Scanner;
pub use text_processing::{extract_ingredients_section, normalize};

/// Build an alias index from a complete ingredient collection
pub fn build_index(ingredients: &[Ingredient]) -> errors::AppResult<AliasIndex> {
    AliasIndex::build(ingredients)
}
