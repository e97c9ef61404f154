//! Integration tests for the shared-setup coordinator.
//!
//! These suites drive real runner executions against the in-memory and
//! dev-chain stores: the end-to-end guarantees that per-module unit tests in
//! crates/engine cannot show on their own (nesting across scopes, failure
//! cascades, rollback visibility between sibling scopes).

#[path = "../common/mod.rs"]
mod common;

mod failures;
mod labels;
mod properties;
