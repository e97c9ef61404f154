//! Process-wide default store
//!
//! Suites that drive a single chain install its store once and declare
//! helpers without passing it around. Only the functions in this module
//! consult the default; [`SharedSetup`] and [`RevertAfter`] always take an
//! explicit store.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use snapfix_core::{SnapfixError, SnapfixResult, StateStore};
use snapfix_runner::Scope;

use crate::revert_after::RevertAfter;
use crate::shared_setup::{SetupHandle, SharedSetup};

// Uses parking_lot::RwLock so a panicking test cannot poison the default
// for every test that follows it.
static DEFAULT_STORE: Lazy<RwLock<Option<Arc<dyn StateStore>>>> = Lazy::new(|| RwLock::new(None));

/// Install `store` as the process default, returning the previous one
pub fn install_default_store(store: Arc<dyn StateStore>) -> Option<Arc<dyn StateStore>> {
    debug!(target: "snapfix::setup", "Installed default state store");
    DEFAULT_STORE.write().replace(store)
}

/// The current process default, if installed
pub fn default_store() -> Option<Arc<dyn StateStore>> {
    DEFAULT_STORE.read().clone()
}

/// Remove the process default, returning it
pub fn clear_default_store() -> Option<Arc<dyn StateStore>> {
    DEFAULT_STORE.write().take()
}

/// Options for the declaration helpers
#[derive(Clone, Default)]
pub struct SharedSetupOptions {
    /// Prefix for hook names
    pub label: Option<String>,
    /// Store to drive; the process default when `None`
    pub store: Option<Arc<dyn StateStore>>,
}

impl SharedSetupOptions {
    /// Options with no label, using the default store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Use `store` instead of the default
    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn resolve_store(&self) -> SnapfixResult<Arc<dyn StateStore>> {
        match &self.store {
            Some(store) => Ok(Arc::clone(store)),
            None => default_store().ok_or_else(|| {
                SnapfixError::invalid_state(
                    "no state store given and no default store installed",
                )
            }),
        }
    }
}

impl fmt::Debug for SharedSetupOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSetupOptions")
            .field("label", &self.label)
            .field("store", &self.store.as_ref().map(|_| "explicit"))
            .finish()
    }
}

/// Declare a [`SharedSetup`] on `scope`
///
/// The store is resolved now, at declaration time. Fails with
/// [`SnapfixError::InvalidState`] when neither an explicit nor a default
/// store is available; nothing is registered in that case.
pub fn shared_before_each<F, Fut>(
    scope: &mut Scope,
    options: SharedSetupOptions,
    initializer: F,
) -> SnapfixResult<SetupHandle>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let store = options.resolve_store()?;
    let mut setup = SharedSetup::new(store, initializer);
    if let Some(label) = options.label {
        setup = setup.with_label(label);
    }
    Ok(setup.register(scope))
}

/// Declare a [`RevertAfter`] on `scope`, resolving the store like
/// [`shared_before_each`]
pub fn revert_after(scope: &mut Scope, options: SharedSetupOptions) -> SnapfixResult<()> {
    let store = options.resolve_store()?;
    let mut rollback = RevertAfter::new(store);
    if let Some(label) = options.label {
        rollback = rollback.with_label(label);
    }
    rollback.register(scope);
    Ok(())
}
