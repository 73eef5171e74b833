//! # Scanner Session Module
//!
//! Ties the matching engine to one user session: the ingredient catalog,
//! the enabled set, the current alias index, and the scan history.
//!
//! Every catalog change builds a complete new [`AliasIndex`] and swaps it in
//! only after the build succeeded; scans clone the current `Arc` and never
//! observe a partially built index. A `Scanner` can be shared behind an
//! `Arc` between tasks; no lock is held while awaiting a text source.

use crate::alias_index::AliasIndex;
use crate::config::AppConfig;
use crate::errors::{error_logging, AppError, AppResult};
use crate::ingredient::{
    load_built_in_catalog, load_catalog_from_path, EnabledSet, Ingredient, IngredientCatalog,
};
use crate::matcher::IngredientMatcher;
use crate::observability;
use crate::preferences::{initialize_enabled_ingredients, PreferenceStore};
use crate::scan::{ScanHistory, ScanResult};
use crate::source::TextSource;
use crate::text_processing::extract_ingredients_section;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Catalog and enabled set, changed together under one lock
#[derive(Debug)]
struct Watchlist {
    catalog: IngredientCatalog,
    enabled: EnabledSet,
}

/// A scanning session over one user's watchlist
pub struct Scanner {
    watchlist: RwLock<Watchlist>,
    index: RwLock<Arc<AliasIndex>>,
    matcher: IngredientMatcher,
    history: Mutex<ScanHistory>,
    source_timeout: Duration,
    store: Option<Arc<dyn PreferenceStore>>,
}

impl Scanner {
    /// Create a session from an explicit catalog and enabled set
    pub fn new(
        catalog: IngredientCatalog,
        enabled: EnabledSet,
        config: &AppConfig,
    ) -> AppResult<Self> {
        config.matcher.validate()?;
        config.scan.validate()?;

        let index = AliasIndex::build(&catalog.all())?;
        Ok(Self {
            watchlist: RwLock::new(Watchlist { catalog, enabled }),
            index: RwLock::new(Arc::new(index)),
            matcher: IngredientMatcher::new(&config.matcher),
            history: Mutex::new(ScanHistory::new(config.scan.history_limit)),
            source_timeout: Duration::from_secs(config.scan.source_timeout_secs),
            store: None,
        })
    }

    /// Create a session whose custom ingredients and enabled set live in `store`.
    ///
    /// On first use every known ingredient is enabled.
    pub fn with_store(
        built_in: Vec<Ingredient>,
        store: Arc<dyn PreferenceStore>,
        config: &AppConfig,
    ) -> AppResult<Self> {
        let custom = store.load_custom().map_err(|e| {
            error_logging::log_storage_error(&e, "load_custom");
            e
        })?;
        let catalog = IngredientCatalog::new(built_in, custom)?;
        let enabled = initialize_enabled_ingredients(store.as_ref(), catalog.ids())?;

        let mut scanner = Self::new(catalog, enabled, config)?;
        scanner.store = Some(store);
        Ok(scanner)
    }

    /// Create a session from configuration alone: the configured (or embedded)
    /// catalog with every ingredient enabled and nothing persisted
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let built_in = match &config.scan.catalog_path {
            Some(path) => load_catalog_from_path(path)?,
            None => load_built_in_catalog()?,
        };
        let catalog = IngredientCatalog::new(built_in, Vec::new())?;
        let enabled = EnabledSet::all_of(catalog.ids());
        Self::new(catalog, enabled, config)
    }

    /// Extract the ingredients section of `raw_text` and match it
    pub fn scan_text(&self, raw_text: &str) -> ScanResult {
        let start = Instant::now();
        let extracted = extract_ingredients_section(raw_text);

        let index = self.index();
        let enabled = self.watchlist.read().enabled.clone();
        let outcome = self.matcher.match_text(&extracted, &index, &enabled);

        let windows = outcome.windows_searched;
        let result = ScanResult::new(extracted, outcome.matches);
        let duration = start.elapsed();

        info!(
            scan_id = %result.id,
            found = result.found_ingredients.len(),
            harmful = result.is_harmful,
            windows,
            duration_ms = duration.as_millis() as u64,
            "Scan completed"
        );
        observability::record_scan_metrics(result.found_ingredients.len(), duration, windows);

        self.history.lock().record(result.clone());
        result
    }

    /// Fetch text from an external source, bounded by the configured timeout,
    /// and scan it
    pub async fn scan_source<S: TextSource>(&self, source: &S) -> AppResult<ScanResult> {
        let start = Instant::now();

        let text = match tokio::time::timeout(self.source_timeout, source.fetch_text()).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                error_logging::log_source_error(&e, "fetch_text", Some(start.elapsed()));
                observability::record_source_failure("error");
                return Err(e);
            }
            Err(_) => {
                let err = AppError::Source(format!(
                    "Text source timed out after {}s",
                    self.source_timeout.as_secs()
                ));
                error_logging::log_source_error(&err, "fetch_text", Some(start.elapsed()));
                observability::record_source_failure("timeout");
                return Err(err);
            }
        };

        debug!(
            text_length = text.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "Text source returned"
        );
        Ok(self.scan_text(&text))
    }

    /// Apply a catalog change, rebuild the index and persist the custom list.
    ///
    /// Nothing is committed unless the index build and the store write both
    /// succeed.
    fn update_catalog<T>(
        &self,
        operation: &str,
        change: impl FnOnce(&mut IngredientCatalog, &mut EnabledSet) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut watchlist = self.watchlist.write();
        let mut catalog = watchlist.catalog.clone();
        let mut enabled = watchlist.enabled.clone();

        let value = change(&mut catalog, &mut enabled)?;
        let index = AliasIndex::build(&catalog.all())?;

        if let Some(store) = &self.store {
            store
                .save_custom(catalog.custom())
                .and_then(|_| store.save_enabled(&enabled))
                .map_err(|e| {
                    error_logging::log_storage_error(&e, operation);
                    e
                })?;
        }

        *self.index.write() = Arc::new(index);
        watchlist.catalog = catalog;
        watchlist.enabled = enabled;
        debug!(operation = %operation, "Watchlist updated");
        Ok(value)
    }

    /// Add a custom ingredient; it starts out enabled
    pub fn add_custom_ingredient(&self, ingredient: Ingredient) -> AppResult<()> {
        self.update_catalog("add_custom_ingredient", |catalog, enabled| {
            let id = ingredient.id.clone();
            catalog.add_custom(ingredient)?;
            enabled.enable(&id);
            Ok(())
        })
    }

    /// Delete a custom ingredient and drop it from the enabled set
    pub fn delete_custom_ingredient(&self, id: &str) -> AppResult<Ingredient> {
        self.update_catalog("delete_custom_ingredient", |catalog, enabled| {
            let removed = catalog.delete_custom(id)?;
            enabled.disable(id);
            Ok(removed)
        })
    }

    /// Replace an edited custom ingredient (same id)
    pub fn replace_custom_ingredient(&self, ingredient: Ingredient) -> AppResult<Ingredient> {
        self.update_catalog("replace_custom_ingredient", |catalog, _| {
            catalog.replace_custom(ingredient)
        })
    }

    /// Replace the whole custom collection, e.g. after a sync
    pub fn set_custom_ingredients(&self, custom: Vec<Ingredient>) -> AppResult<()> {
        self.update_catalog("set_custom_ingredients", |catalog, _| {
            catalog.set_custom(custom)
        })
    }

    /// Flip one ingredient on or off, returning whether it is now enabled
    pub fn toggle_ingredient(&self, id: &str) -> AppResult<bool> {
        let mut watchlist = self.watchlist.write();
        let mut enabled = watchlist.enabled.clone();
        let now_enabled = enabled.toggle(id);
        self.persist_enabled(&enabled)?;
        watchlist.enabled = enabled;
        Ok(now_enabled)
    }

    /// Replace the enabled set wholesale
    pub fn set_enabled(&self, enabled: EnabledSet) -> AppResult<()> {
        let mut watchlist = self.watchlist.write();
        self.persist_enabled(&enabled)?;
        watchlist.enabled = enabled;
        Ok(())
    }

    fn persist_enabled(&self, enabled: &EnabledSet) -> AppResult<()> {
        match &self.store {
            Some(store) => store.save_enabled(enabled).map_err(|e| {
                error_logging::log_storage_error(&e, "save_enabled");
                e
            }),
            None => Ok(()),
        }
    }

    /// The alias index scans currently run against
    pub fn index(&self) -> Arc<AliasIndex> {
        Arc::clone(&self.index.read())
    }

    pub fn enabled(&self) -> EnabledSet {
        self.watchlist.read().enabled.clone()
    }

    /// Built-in and custom ingredients
    pub fn ingredients(&self) -> Vec<Ingredient> {
        self.watchlist.read().catalog.all()
    }

    /// Past scans, newest first
    pub fn history(&self) -> Vec<ScanResult> {
        self.history.lock().entries().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredient::Severity;
    use crate::preferences::InMemoryPreferenceStore;

    fn custom(id: &str, name: &str) -> Ingredient {
        Ingredient {
            id: id.to_string(),
            name: name.to_string(),
            aliases: vec![name.to_lowercase()],
            severity: Severity::Low,
            description: String::new(),
            why_harmful: String::new(),
            source: None,
            is_custom: true,
        }
    }

    #[test]
    fn test_catalog_change_swaps_index() {
        let scanner = Scanner::from_config(&AppConfig::default()).unwrap();
        let before = scanner.index();

        scanner
            .add_custom_ingredient(custom("custom_palm", "Palm Oil"))
            .unwrap();
        let after = scanner.index();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.len(), before.len() + 1);
        assert!(scanner.enabled().contains("custom_palm"));
    }

    #[test]
    fn test_failed_change_keeps_previous_state() {
        let scanner = Scanner::from_config(&AppConfig::default()).unwrap();
        let before = scanner.index();

        assert!(scanner.delete_custom_ingredient("msg").is_err());
        assert!(Arc::ptr_eq(&before, &scanner.index()));
        assert!(scanner.enabled().contains("msg"));
    }

    #[test]
    fn test_store_receives_changes() {
        let store = Arc::new(InMemoryPreferenceStore::new());
        let built_in = load_built_in_catalog().unwrap();
        let scanner = Scanner::with_store(built_in, store.clone(), &AppConfig::default()).unwrap();

        scanner
            .add_custom_ingredient(custom("custom_palm", "Palm Oil"))
            .unwrap();
        assert_eq!(store.load_custom().unwrap().len(), 1);
        assert!(store.load_enabled().unwrap().unwrap().contains("custom_palm"));

        assert!(!scanner.toggle_ingredient("msg").unwrap());
        assert!(!store.load_enabled().unwrap().unwrap().contains("msg"));

        scanner.delete_custom_ingredient("custom_palm").unwrap();
        assert!(store.load_custom().unwrap().is_empty());
        assert!(!store.load_enabled().unwrap().unwrap().contains("custom_palm"));
    }
}
