//! Shared-setup engine for snapfix
//!
//! This crate ties a [`StateStore`](snapfix_core::StateStore) to the scope
//! runner:
//! - SharedSetup: Runs an expensive initializer once per scope and resets
//!   state between tests with snapshot/restore
//! - RevertAfter: Rolls a scope's state back when it exits
//! - defaults: Process-wide default store and declaration helpers that
//!   fall back to it
//!
//! The coordinator itself never reads ambient state; only the `defaults`
//! helpers do.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod defaults;
pub mod revert_after;
pub mod shared_setup;

pub use defaults::{
    clear_default_store, default_store, install_default_store, revert_after, shared_before_each,
    SharedSetupOptions,
};
pub use revert_after::{RevertAfter, STEP_REVERT_AFTER, STEP_SNAPSHOT_BEFORE};
pub use shared_setup::{
    hook_name, Initializer, ResetMarker, SetupHandle, SetupPhase, SharedSetup,
    STEP_CAPTURE_INITIAL, STEP_INITIALIZE, STEP_RESET_AFTER_TEST, STEP_RESET_TO_INITIAL,
};
