//! Core trait for the state store abstraction
//!
//! The StateStore trait is the only thing the shared-setup coordinator knows
//! about the system under test. Anything that can capture its mutable state
//! and later roll back to it (a development chain, an in-memory map, a
//! copy-on-write filesystem) can sit behind it.

use async_trait::async_trait;

use crate::error::SnapfixResult;
use crate::snapshot::SnapshotId;

/// Capture/restore boundary of the shared mutable state
///
/// Thread safety: implementations are shared behind `Arc` between every hook
/// a coordinator registers, so they must be `Send + Sync`.
///
/// # Examples
///
/// ```ignore
/// let id = store.capture().await?;
/// // ... mutate ...
/// assert!(store.restore(&id).await?);
/// // `id` is consumed now, capture again before the next restore
/// ```
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Capture the current state and return an identifier for it
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or cannot snapshot
    /// in its current state.
    async fn capture(&self) -> SnapfixResult<SnapshotId>;

    /// Restore state to `id`
    ///
    /// Returns whether the identifier was valid at call time. After a
    /// successful restore the identifier must be treated as consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    async fn restore(&self, id: &SnapshotId) -> SnapfixResult<bool>;
}
