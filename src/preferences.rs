//! # User Preferences
//!
//! The enabled-ingredient set and the custom ingredient collection are owned
//! by the caller and persisted by whatever store it provides. This module
//! defines that store's interface and the first-use defaults.

use crate::errors::AppResult;
use crate::ingredient::{EnabledSet, Ingredient};
use parking_lot::Mutex;
use tracing::info;

/// Persistence for user preferences
pub trait PreferenceStore: Send + Sync {
    /// Stored enabled set, or `None` if nothing was ever saved
    fn load_enabled(&self) -> AppResult<Option<EnabledSet>>;
    fn save_enabled(&self, enabled: &EnabledSet) -> AppResult<()>;
    fn load_custom(&self) -> AppResult<Vec<Ingredient>>;
    fn save_custom(&self, custom: &[Ingredient]) -> AppResult<()>;
}

/// Process-local store, for tests and one-shot runs
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    enabled: Mutex<Option<EnabledSet>>,
    custom: Mutex<Vec<Ingredient>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load_enabled(&self) -> AppResult<Option<EnabledSet>> {
        Ok(self.enabled.lock().clone())
    }

    fn save_enabled(&self, enabled: &EnabledSet) -> AppResult<()> {
        *self.enabled.lock() = Some(enabled.clone());
        Ok(())
    }

    fn load_custom(&self) -> AppResult<Vec<Ingredient>> {
        Ok(self.custom.lock().clone())
    }

    fn save_custom(&self, custom: &[Ingredient]) -> AppResult<()> {
        *self.custom.lock() = custom.to_vec();
        Ok(())
    }
}

/// Load the enabled set, enabling every known ingredient on first use.
///
/// An empty stored set counts as first use.
pub fn initialize_enabled_ingredients<'a>(
    store: &dyn PreferenceStore,
    all_ids: impl IntoIterator<Item = &'a str>,
) -> AppResult<EnabledSet> {
    if let Some(stored) = store.load_enabled()? {
        if !stored.is_empty() {
            return Ok(stored);
        }
    }

    let enabled = EnabledSet::all_of(all_ids);
    info!(
        enabled = enabled.len(),
        "First use: enabling all known ingredients"
    );
    store.save_enabled(&enabled)?;
    Ok(enabled)
}
