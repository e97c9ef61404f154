//! MemoryStore: keyed in-memory state with snapshot support
//!
//! The smallest useful `StateStore`: named integer cells behind a
//! `parking_lot::RwLock`, with snapshots kept in a [`SnapshotLog`]. It is the
//! store the coordinator's own tests and the documentation scenarios run
//! against.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use snapfix_core::{SnapfixResult, SnapshotId, StateStore};

use crate::snapshot::SnapshotLog;

/// In-memory keyed state
///
/// Missing keys read as `0`, mirroring how an untouched account balance
/// reads on a development chain.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Current state
    data: RwLock<BTreeMap<String, i64>>,
    /// Captured states
    snapshots: Mutex<SnapshotLog<BTreeMap<String, i64>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let data = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        MemoryStore {
            data: RwLock::new(data),
            snapshots: Mutex::new(SnapshotLog::new()),
        }
    }

    /// Read a cell
    pub fn get(&self, key: &str) -> i64 {
        self.data.read().get(key).copied().unwrap_or(0)
    }

    /// Overwrite a cell
    pub fn set(&self, key: &str, value: i64) {
        self.data.write().insert(key.to_string(), value);
    }

    /// Add `delta` to a cell and return the new value
    pub fn add(&self, key: &str, delta: i64) -> i64 {
        let mut data = self.data.write();
        let cell = data.entry(key.to_string()).or_insert(0);
        *cell += delta;
        *cell
    }

    /// Remove a cell, returning its last value
    pub fn remove(&self, key: &str) -> Option<i64> {
        self.data.write().remove(key)
    }

    /// Copy of the full state
    pub fn entries(&self) -> BTreeMap<String, i64> {
        self.data.read().clone()
    }

    /// Number of live snapshots
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().len()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn capture(&self) -> SnapfixResult<SnapshotId> {
        // Hold the data lock while logging so no write lands between the
        // copy and the id assignment.
        let data = self.data.read();
        let id = self.snapshots.lock().capture(&data);
        debug!(target: "snapfix::store", snapshot = %id, "memory store captured");
        Ok(id)
    }

    async fn restore(&self, id: &SnapshotId) -> SnapfixResult<bool> {
        let mut data = self.data.write();
        match self.snapshots.lock().revert(id) {
            Some(saved) => {
                *data = saved;
                debug!(target: "snapfix::store", snapshot = %id, "memory store restored");
                Ok(true)
            }
            None => {
                debug!(target: "snapfix::store", snapshot = %id, "memory store refused unknown snapshot");
                Ok(false)
            }
        }
    }
}
