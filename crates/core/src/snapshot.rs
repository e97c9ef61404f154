//! Snapshot identifier type
//!
//! A snapshot identifier is whatever the state store hands back from a
//! capture. Development chains return quantities such as `"0x1"`, other
//! stores may return UUIDs or paths. The coordinator never inspects the
//! contents, it only passes the token back to `restore`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token representing a restorable point in shared state
///
/// Most stores consume an identifier when it is restored to, so holders
/// must re-capture after every successful restore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Wrap a raw identifier returned by a store
    pub fn new(raw: impl Into<String>) -> Self {
        SnapshotId(raw.into())
    }

    /// Identifier in the quantity form used by development chains (`0x1f`)
    pub fn from_counter(counter: u64) -> Self {
        SnapshotId(format!("0x{:x}", counter))
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the raw identifier
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SnapshotId {
    fn from(raw: String) -> Self {
        SnapshotId(raw)
    }
}

impl From<&str> for SnapshotId {
    fn from(raw: &str) -> Self {
        SnapshotId(raw.to_string())
    }
}
