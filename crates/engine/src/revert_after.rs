//! Scope-exit rollback
//!
//! [`RevertAfter`] captures the state on scope entry and restores it on
//! scope exit. Tests inside the scope see each other's changes; only the
//! scope as a whole is isolated from its siblings.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use snapfix_core::{SnapfixError, SnapfixResult, SnapshotId, StateStore};
use snapfix_runner::Scope;

use crate::shared_setup::hook_name;

/// Step capturing the state on scope entry
pub const STEP_SNAPSHOT_BEFORE: &str = "Take snapshot before scope";
/// Step restoring it on scope exit
pub const STEP_REVERT_AFTER: &str = "Revert after scope";

struct Rollback {
    store: Arc<dyn StateStore>,
    snapshot: Mutex<Option<SnapshotId>>,
}

impl Rollback {
    async fn capture(&self) -> SnapfixResult<()> {
        let id = self.store.capture().await?;
        debug!(target: "snapfix::setup", snapshot = %id, "Captured state before scope");
        *self.snapshot.lock() = Some(id);
        Ok(())
    }

    async fn revert(&self) -> SnapfixResult<()> {
        let id = self
            .snapshot
            .lock()
            .take()
            .ok_or_else(|| SnapfixError::snapshot_missing(STEP_REVERT_AFTER))?;
        if !self.store.restore(&id).await? {
            return Err(SnapfixError::snapshot_rejected(id));
        }
        info!(target: "snapfix::setup", snapshot = %id, "Reverted scope state");
        Ok(())
    }
}

/// Roll a scope's state back when it exits
pub struct RevertAfter {
    label: Option<String>,
    store: Arc<dyn StateStore>,
}

impl RevertAfter {
    /// Rollback driving `store`
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        RevertAfter { label: None, store }
    }

    /// Name both hooks after `label`
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Register the capture and restore hooks on `scope`
    pub fn register(self, scope: &mut Scope) {
        let rollback = Arc::new(Rollback {
            store: self.store,
            snapshot: Mutex::new(None),
        });

        let r = Arc::clone(&rollback);
        scope.before_all(
            hook_name(self.label.as_deref(), STEP_SNAPSHOT_BEFORE),
            move |_| {
                let r = Arc::clone(&r);
                async move { r.capture().await.map_err(anyhow::Error::from) }
            },
        );

        scope.after_all(
            hook_name(self.label.as_deref(), STEP_REVERT_AFTER),
            move |_| {
                let r = Arc::clone(&rollback);
                async move { r.revert().await.map_err(anyhow::Error::from) }
            },
        );
    }
}

impl fmt::Debug for RevertAfter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevertAfter")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
