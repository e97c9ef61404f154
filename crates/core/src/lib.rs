//! Core types and traits for snapfix
//!
//! This crate defines the foundational pieces every other crate builds on:
//! - SnapshotId: Opaque token naming a restorable point in shared state
//! - StateStore: The capture/restore boundary the coordinator drives
//! - Error: Error type hierarchy for store and coordinator failures

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod snapshot;
pub mod traits;

pub use error::{SnapfixError, SnapfixResult};
pub use snapshot::SnapshotId;
pub use traits::StateStore;
