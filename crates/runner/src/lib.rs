//! Hierarchical scope runner for snapfix
//!
//! A small async runner with nested scopes and ordered lifecycle hooks, the
//! collaborator the shared-setup coordinator registers itself into:
//!
//! - Scope: Tree of leaf tests, nested scopes and hooks
//! - Suite: Root scope plus runner configuration; `run` executes the tree
//! - TestHandle: Per-test execution record carrying typed markers
//! - RunReport: Ordered outcomes and recorded hook failures
//!
//! # Ordering
//!
//! Within a scope: `before_all` hooks, then the scope's own tests, then its
//! nested scopes, then `after_all` hooks. Around every test: `before_each`
//! hooks outermost first, the body, then `after_each` hooks innermost first.
//! Teardown hooks on one scope run in reverse registration order.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod report;
pub mod runner;
pub mod scope;

pub use config::{RunnerConfig, CONFIG_FILE_NAME};
pub use context::{HookContext, TestContext, TestHandle};
pub use report::{HookFailure, RunReport, TestOutcome, TestStatus};
pub use runner::Suite;
pub use scope::{HookKind, Scope};
