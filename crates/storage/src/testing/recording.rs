//! Recording store wrapper
//!
//! Keeps an ordered log of every call that reached the wrapped store so
//! tests can assert on how many physical captures and restores happened,
//! and in which order.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use snapfix_core::{SnapfixError, SnapfixResult, SnapshotId, StateStore};

/// A call observed by [`RecordingStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// Successful capture
    Capture(SnapshotId),
    /// Restore that reached the inner store
    Restore {
        /// Identifier restored to
        id: SnapshotId,
        /// What the inner store answered
        accepted: bool,
    },
    /// Capture failed by injection
    FailedCapture,
    /// Restore failed by injection
    FailedRestore(SnapshotId),
}

/// Store wrapper recording calls and injecting faults
#[derive(Debug)]
pub struct RecordingStore<S> {
    inner: S,
    calls: Mutex<Vec<StoreCall>>,
    fail_capture: AtomicBool,
    fail_restore: AtomicBool,
}

impl<S: StateStore> RecordingStore<S> {
    /// Wrap `inner`
    pub fn new(inner: S) -> Self {
        RecordingStore {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_capture: AtomicBool::new(false),
            fail_restore: AtomicBool::new(false),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Make the next capture fail with `Unreachable`
    pub fn fail_next_capture(&self) {
        self.fail_capture.store(true, Ordering::SeqCst);
    }

    /// Make the next restore fail with `Unreachable`
    pub fn fail_next_restore(&self) {
        self.fail_restore.store(true, Ordering::SeqCst);
    }

    /// Copy of the call log
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Forget recorded calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Number of captures that reached the inner store
    pub fn capture_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, StoreCall::Capture(_)))
            .count()
    }

    /// Number of restores that reached the inner store
    pub fn restore_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, StoreCall::Restore { .. }))
            .count()
    }

    /// Identifiers restored to, in order
    pub fn restored_ids(&self) -> Vec<SnapshotId> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                StoreCall::Restore { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl<S: StateStore> StateStore for RecordingStore<S> {
    async fn capture(&self) -> SnapfixResult<SnapshotId> {
        if self.fail_capture.swap(false, Ordering::SeqCst) {
            self.calls.lock().push(StoreCall::FailedCapture);
            return Err(SnapfixError::unreachable("injected capture failure"));
        }
        let id = self.inner.capture().await?;
        self.calls.lock().push(StoreCall::Capture(id.clone()));
        Ok(id)
    }

    async fn restore(&self, id: &SnapshotId) -> SnapfixResult<bool> {
        if self.fail_restore.swap(false, Ordering::SeqCst) {
            self.calls.lock().push(StoreCall::FailedRestore(id.clone()));
            return Err(SnapfixError::unreachable("injected restore failure"));
        }
        let accepted = self.inner.restore(id).await?;
        self.calls.lock().push(StoreCall::Restore {
            id: id.clone(),
            accepted,
        });
        Ok(accepted)
    }
}
