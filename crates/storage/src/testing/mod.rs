//! Testing utilities for state stores
//!
//! - **RecordingStore**: Wraps any store, records every capture/restore and
//!   injects failures on demand
//!
//! # Example
//!
//! ```ignore
//! use snapfix_storage::testing::{RecordingStore, StoreCall};
//!
//! let store = RecordingStore::new(MemoryStore::new());
//! store.fail_next_restore();
//! // ... drive a coordinator ...
//! assert_eq!(store.restore_count(), 1);
//! ```

mod recording;

pub use recording::{RecordingStore, StoreCall};
