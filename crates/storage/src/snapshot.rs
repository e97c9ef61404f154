//! SnapshotLog: snapshot bookkeeping for in-memory stores
//!
//! Follows the semantics development chains give `evm_snapshot` /
//! `evm_revert`:
//!
//! - Capturing clones the full state and hands out the next id (`0x1`,
//!   `0x2`, ...). Ids are never reused.
//! - Reverting to an id restores its state and discards that snapshot and
//!   every snapshot captured after it.
//! - Reverting to an unknown or already discarded id is refused.
//!
//! # Design Notes
//!
//! - **Deep clone**: Each snapshot owns a full copy of the state. The stores
//!   built on this hold small fixtures, so the copy is not a concern.
//! - **Ordered**: Entries are kept in capture order, so "everything after"
//!   is a truncation.

use snapfix_core::SnapshotId;

/// Ordered log of captured states
#[derive(Debug, Clone)]
pub struct SnapshotLog<S> {
    /// Live snapshots in capture order
    entries: Vec<(SnapshotId, S)>,
    /// Last counter value handed out
    counter: u64,
}

impl<S: Clone> SnapshotLog<S> {
    /// Create an empty log
    pub fn new() -> Self {
        SnapshotLog {
            entries: Vec::new(),
            counter: 0,
        }
    }

    /// Record a copy of `state` and return its identifier
    pub fn capture(&mut self, state: &S) -> SnapshotId {
        self.counter += 1;
        let id = SnapshotId::from_counter(self.counter);
        self.entries.push((id.clone(), state.clone()));
        id
    }

    /// Take the state saved under `id`, discarding it and all later snapshots
    ///
    /// Returns `None` if `id` is not live.
    pub fn revert(&mut self, id: &SnapshotId) -> Option<S> {
        let position = self.entries.iter().position(|(live, _)| live == id)?;
        let mut discarded = self.entries.split_off(position);
        Some(discarded.swap_remove(0).1)
    }

    /// Whether `id` can still be reverted to
    pub fn contains(&self, id: &SnapshotId) -> bool {
        self.entries.iter().any(|(live, _)| live == id)
    }

    /// Number of live snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no snapshot is live
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Clone> Default for SnapshotLog<S> {
    fn default() -> Self {
        Self::new()
    }
}
