//! Snapfix - snapshot-backed shared test setup
//!
//! Run an expensive initializer once per test scope, then give every test in
//! that scope the initializer's resulting state by snapshotting it once and
//! restoring it after each test. Scopes nest: an inner setup builds on the
//! outer one's state and each test is reset exactly once.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use snapfix::{MemoryStore, SharedSetup, Suite};
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut suite = Suite::new("balances");
//!
//! let seeded = Arc::clone(&store);
//! SharedSetup::new(store.clone(), move || {
//!     seeded.add("balance", 1);
//!     async { anyhow::Ok(()) }
//! })
//! .with_label("Seed balance")
//! .register(suite.root());
//!
//! let report = suite.run().await;
//! assert!(report.is_success());
//! ```
//!
//! # Architecture
//!
//! - `snapfix-core`: errors, snapshot ids and the [`StateStore`] trait
//! - `snapfix-storage`: in-memory, JSON-RPC and dev-chain stores
//! - `snapfix-runner`: the scope runner the hooks are registered into
//! - `snapfix-engine`: [`SharedSetup`], [`RevertAfter`] and the default store

pub use snapfix_core::{SnapfixError, SnapfixResult, SnapshotId, StateStore};
pub use snapfix_engine::*;
pub use snapfix_runner::{
    HookContext, HookFailure, HookKind, RunReport, RunnerConfig, Scope, Suite, TestContext,
    TestHandle, TestOutcome, TestStatus,
};
pub use snapfix_storage::{
    parse_quantity, testing, to_quantity, DevChain, MemoryStore, Provider, RpcStore, SnapshotLog,
    DEFAULT_SENDER, GENESIS_BALANCE,
};
