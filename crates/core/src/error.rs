//! Error types for snapfix
//!
//! This module defines the errors raised at the state store boundary and by
//! the shared-setup coordinator. We use `thiserror` for automatic `Display`
//! and `Error` trait implementations.
//!
//! Initializer and test-body failures are not represented here: they are
//! user errors and travel to the runner as `anyhow::Error` untouched.

use crate::snapshot::SnapshotId;
use thiserror::Error;

/// Result type alias for snapfix operations
pub type SnapfixResult<T> = std::result::Result<T, SnapfixError>;

/// Error types for snapfix
#[derive(Debug, Error)]
pub enum SnapfixError {
    /// The state store could not be reached or refused to serve the call
    #[error("State store unreachable: {0}")]
    Unreachable(String),

    /// The store did not accept a snapshot identifier (unknown, expired or consumed)
    #[error("Snapshot {id} was rejected by the state store")]
    SnapshotRejected {
        /// The identifier that was rejected
        id: SnapshotId,
    },

    /// A restore was requested before the identifier for it was captured
    #[error("No snapshot available for step \"{step}\"")]
    SnapshotMissing {
        /// The lifecycle step that needed the snapshot
        step: String,
    },

    /// The store does not implement the requested method
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The store answered with a payload of the wrong shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lifecycle step ran in a state that does not allow it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SnapfixError {
    /// Store could not be reached
    pub fn unreachable(msg: impl Into<String>) -> Self {
        SnapfixError::Unreachable(msg.into())
    }

    /// Store rejected `id`
    pub fn snapshot_rejected(id: SnapshotId) -> Self {
        SnapfixError::SnapshotRejected { id }
    }

    /// `step` needed a snapshot that was never captured
    pub fn snapshot_missing(step: impl Into<String>) -> Self {
        SnapfixError::SnapshotMissing { step: step.into() }
    }

    /// Malformed store response
    pub fn protocol(msg: impl Into<String>) -> Self {
        SnapfixError::Protocol(msg.into())
    }

    /// Lifecycle violation
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        SnapfixError::InvalidState(msg.into())
    }

    /// Configuration failure
    pub fn config(msg: impl Into<String>) -> Self {
        SnapfixError::Config(msg.into())
    }

    /// Whether the error originated at the state store boundary
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            SnapfixError::Unreachable(_)
                | SnapfixError::SnapshotRejected { .. }
                | SnapfixError::SnapshotMissing { .. }
                | SnapfixError::UnsupportedMethod(_)
                | SnapfixError::Protocol(_)
                | SnapfixError::Serialization(_)
        )
    }
}
