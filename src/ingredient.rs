//! # Ingredient Catalog Module
//!
//! Watched ingredient records, the built-in catalog and the user's custom
//! additions, plus the enabled-ingredient set.
//!
//! Built-in and custom ingredients share one record type; `is_custom` is the
//! only thing telling them apart. Custom records are never edited in place:
//! an edit replaces the whole record under the same id.

use crate::errors::{error_logging, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Built-in catalog shipped with the crate
const BUILT_IN_CATALOG: &str = include_str!("../config/ingredients.json");

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// How strongly an ingredient should be avoided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Numeric rank used for ordering (High=3, Medium=2, Low=1)
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
        }
    }
}

/// A watched ingredient, built-in or user-authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Unique id across built-in and custom ingredients
    pub id: String,
    /// Display name
    pub name: String,
    /// Lowercase text forms used for matching; includes the lowercased name
    pub aliases: Vec<String>,
    pub severity: Severity,
    pub description: String,
    /// Why the ingredient is considered harmful
    #[serde(default)]
    pub why_harmful: String,
    /// Optional reference URL
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
}

impl Ingredient {
    /// Create a user-authored ingredient.
    ///
    /// The id is derived from the current time (`custom_<millis>`) and the
    /// only alias is the lowercased, trimmed name.
    pub fn new_custom(
        name: &str,
        description: &str,
        severity: Severity,
        why_harmful: &str,
    ) -> AppResult<Self> {
        let name = validate_ingredient_name(name)?;

        let description = description.trim();
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(AppError::Validation(format!(
                "Description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }

        Ok(Self {
            id: format!("custom_{}", chrono::Utc::now().timestamp_millis()),
            name: name.to_string(),
            aliases: vec![name.to_lowercase()],
            severity,
            description: description.to_string(),
            why_harmful: why_harmful.trim().to_string(),
            source: None,
            is_custom: true,
        })
    }
}

/// Validate a custom ingredient name, returning the trimmed name
///
/// # Examples
/// ```
/// use clean_scan::ingredient::validate_ingredient_name;
///
/// assert_eq!(validate_ingredient_name("  Palm Oil ").unwrap(), "Palm Oil");
/// assert!(validate_ingredient_name("   ").is_err());
/// ```
pub fn validate_ingredient_name(name: &str) -> AppResult<&str> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        let err = AppError::Validation("Ingredient name cannot be empty".to_string());
        error_logging::log_validation_error(&err, "validate_ingredient_name", "name", Some(name));
        return Err(err);
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        let err = AppError::Validation(format!(
            "Ingredient name cannot exceed {} characters",
            MAX_NAME_LENGTH
        ));
        error_logging::log_validation_error(&err, "validate_ingredient_name", "name", Some(name));
        return Err(err);
    }

    Ok(trimmed)
}

/// Check catalog invariants: every ingredient has aliases and ids are unique
fn validate_records<'a>(ingredients: impl IntoIterator<Item = &'a Ingredient>) -> AppResult<()> {
    let mut seen = HashSet::new();
    for ingredient in ingredients {
        if ingredient.aliases.is_empty() {
            return Err(AppError::Catalog(format!(
                "Ingredient '{}' has no aliases",
                ingredient.id
            )));
        }
        if !seen.insert(ingredient.id.as_str()) {
            return Err(AppError::Catalog(format!(
                "Duplicate ingredient id '{}'",
                ingredient.id
            )));
        }
    }
    Ok(())
}

/// Parse a JSON array of ingredient records and validate it
pub fn parse_catalog(json: &str) -> AppResult<Vec<Ingredient>> {
    let ingredients: Vec<Ingredient> = serde_json::from_str(json)?;
    validate_records(&ingredients)?;
    Ok(ingredients)
}

/// Load the built-in catalog embedded in the crate
pub fn load_built_in_catalog() -> AppResult<Vec<Ingredient>> {
    let ingredients = parse_catalog(BUILT_IN_CATALOG)?;
    debug!(count = ingredients.len(), "Loaded built-in ingredient catalog");
    Ok(ingredients)
}

/// Load a catalog from a JSON file, e.g. one configured with `CATALOG_PATH`
pub fn load_catalog_from_path(path: &Path) -> AppResult<Vec<Ingredient>> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Catalog(format!(
            "Failed to read catalog file {}: {}",
            path.display(),
            e
        ))
    })?;

    match parse_catalog(&content) {
        Ok(ingredients) => {
            info!(
                path = %path.display(),
                count = ingredients.len(),
                "Loaded ingredient catalog from file"
            );
            Ok(ingredients)
        }
        Err(e) => {
            error_logging::log_catalog_error(&e, "load_catalog_from_path", None, None);
            Err(e)
        }
    }
}

/// Built-in catalog plus the user's custom ingredients
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    built_in: Vec<Ingredient>,
    custom: Vec<Ingredient>,
}

impl IngredientCatalog {
    /// Create a catalog from built-in records and existing custom records
    pub fn new(built_in: Vec<Ingredient>, custom: Vec<Ingredient>) -> AppResult<Self> {
        if let Some(ingredient) = custom.iter().find(|i| !i.is_custom) {
            return Err(AppError::Catalog(format!(
                "Ingredient '{}' is not marked as custom",
                ingredient.id
            )));
        }
        validate_records(built_in.iter().chain(custom.iter()))?;
        Ok(Self { built_in, custom })
    }

    /// All ingredients, built-ins first, then customs in insertion order
    pub fn all(&self) -> Vec<Ingredient> {
        self.built_in.iter().chain(self.custom.iter()).cloned().collect()
    }

    /// Iterate over every ingredient id
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.built_in
            .iter()
            .chain(self.custom.iter())
            .map(|i| i.id.as_str())
    }

    pub fn built_in(&self) -> &[Ingredient] {
        &self.built_in
    }

    pub fn custom(&self) -> &[Ingredient] {
        &self.custom
    }

    pub fn len(&self) -> usize {
        self.built_in.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an ingredient by id
    pub fn get(&self, id: &str) -> Option<&Ingredient> {
        self.built_in
            .iter()
            .chain(self.custom.iter())
            .find(|i| i.id == id)
    }

    /// Add a user-authored ingredient
    pub fn add_custom(&mut self, ingredient: Ingredient) -> AppResult<()> {
        if !ingredient.is_custom {
            return Err(AppError::Catalog(format!(
                "Ingredient '{}' is not marked as custom",
                ingredient.id
            )));
        }
        if ingredient.aliases.is_empty() {
            return Err(AppError::Catalog(format!(
                "Ingredient '{}' has no aliases",
                ingredient.id
            )));
        }
        if self.get(&ingredient.id).is_some() {
            return Err(AppError::Catalog(format!(
                "Duplicate ingredient id '{}'",
                ingredient.id
            )));
        }

        debug!(ingredient_id = %ingredient.id, "Adding custom ingredient");
        self.custom.push(ingredient);
        Ok(())
    }

    /// Delete a custom ingredient; built-in ingredients cannot be deleted
    pub fn delete_custom(&mut self, id: &str) -> AppResult<Ingredient> {
        if self.built_in.iter().any(|i| i.id == id) {
            return Err(AppError::Validation(format!(
                "Built-in ingredient '{}' cannot be deleted",
                id
            )));
        }

        let position = self
            .custom
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AppError::Validation(format!("Unknown ingredient '{}'", id)))?;

        debug!(ingredient_id = %id, "Deleting custom ingredient");
        Ok(self.custom.remove(position))
    }

    /// Replace a custom ingredient with an edited record carrying the same id
    pub fn replace_custom(&mut self, ingredient: Ingredient) -> AppResult<Ingredient> {
        if !ingredient.is_custom {
            return Err(AppError::Catalog(format!(
                "Ingredient '{}' is not marked as custom",
                ingredient.id
            )));
        }
        if ingredient.aliases.is_empty() {
            return Err(AppError::Catalog(format!(
                "Ingredient '{}' has no aliases",
                ingredient.id
            )));
        }

        let slot = self
            .custom
            .iter_mut()
            .find(|i| i.id == ingredient.id)
            .ok_or_else(|| {
                AppError::Validation(format!("Unknown custom ingredient '{}'", ingredient.id))
            })?;

        Ok(std::mem::replace(slot, ingredient))
    }

    /// Replace the whole custom collection, as delivered by a sync or store
    pub fn set_custom(&mut self, custom: Vec<Ingredient>) -> AppResult<()> {
        let checked = match custom.iter().find(|i| !i.is_custom) {
            Some(ingredient) => Err(AppError::Catalog(format!(
                "Ingredient '{}' is not marked as custom",
                ingredient.id
            ))),
            None => validate_records(self.built_in.iter().chain(custom.iter())),
        };

        if let Err(e) = checked {
            warn!(error = %e, "Rejected custom ingredient collection");
            return Err(e);
        }

        self.custom = custom;
        Ok(())
    }
}

/// The ingredient ids the user currently wants flagged.
///
/// Ids that no longer resolve to a loaded ingredient are harmless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledSet(HashSet<String>);

impl EnabledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default policy: every known ingredient enabled
    pub fn all_of<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self(ids.into_iter().map(str::to_string).collect())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn enable(&mut self, id: &str) {
        self.0.insert(id.to_string());
    }

    pub fn disable(&mut self, id: &str) {
        self.0.remove(id);
    }

    /// Flip an id, returning whether it is now enabled
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for EnabledSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
