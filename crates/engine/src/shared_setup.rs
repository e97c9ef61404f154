//! Shared setup: run an initializer once per scope, reset between tests
//!
//! Declaring a [`SharedSetup`] on a scope registers four hooks:
//!
//! 1. `before_all` "Take initial state snapshot": capture the state the
//!    scope was entered with.
//! 2. `before_all` "Run the initializer and snapshot": run the initializer
//!    once, then capture the post-initializer state.
//! 3. `after_each` "Reset after test": restore the post-initializer state
//!    and capture it again, since restoring consumes the identifier.
//! 4. `after_all` "Reset to initial state": restore the entry state.
//!
//! # Nesting
//!
//! Every coordinator enclosing a test registers an `after_each` hook around
//! it, but one restore is enough: the innermost coordinator's snapshot
//! already contains every outer initializer's work. The first coordinator
//! to reset a test attaches a [`ResetMarker`] to its [`TestHandle`], and the
//! others skip. `after_each` hooks run innermost first, so the first one is
//! the innermost one.
//!
//! # State machine
//!
//! ```text
//! Unentered -> Entering -> Initialized <-> PerTestReset
//!                              |
//!                              v
//!                            Exited
//! ```
//!
//! A failed store call leaves the phase where it was. Nothing is retried
//! and no snapshot is re-derived; later hooks fail against whatever
//! identifier is (or is not) held.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, info};

use snapfix_core::{SnapfixError, SnapfixResult, SnapshotId, StateStore};
use snapfix_runner::{HookContext, Scope, TestHandle};

/// Step capturing the state the scope was entered with
pub const STEP_CAPTURE_INITIAL: &str = "Take initial state snapshot";
/// Step running the initializer and capturing its result
pub const STEP_INITIALIZE: &str = "Run the initializer and snapshot";
/// Step restoring the post-initializer state after each test
pub const STEP_RESET_AFTER_TEST: &str = "Reset after test";
/// Step restoring the entry state when the scope exits
pub const STEP_RESET_TO_INITIAL: &str = "Reset to initial state";

/// Boxed initializer
pub type Initializer = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Hook name for `step`, prefixed with `label` when one is given
///
/// ```
/// use snapfix_engine::hook_name;
///
/// assert_eq!(hook_name(None, "Reset after test"), "Reset after test");
/// assert_eq!(
///     hook_name(Some("deploy"), "Reset after test"),
///     "deploy at step \"Reset after test\""
/// );
/// ```
pub fn hook_name(label: Option<&str>, step: &str) -> String {
    match label {
        Some(label) => format!("{} at step \"{}\"", label, step),
        None => step.to_string(),
    }
}

/// Lifecycle phase of one coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupPhase {
    /// Declared, scope not entered yet
    Unentered,
    /// Initial state captured, initializer not finished
    Entering,
    /// Post-initializer state captured and current
    Initialized,
    /// Restoring after a test, post-initializer id not re-captured yet
    PerTestReset,
    /// Entry state restored; terminal
    Exited,
}

impl fmt::Display for SetupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetupPhase::Unentered => "unentered",
            SetupPhase::Entering => "entering",
            SetupPhase::Initialized => "initialized",
            SetupPhase::PerTestReset => "per-test reset",
            SetupPhase::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// Marker attached to a test once its shared state has been reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetMarker;

#[derive(Debug)]
struct SetupState {
    phase: SetupPhase,
    initial: Option<SnapshotId>,
    post_init: Option<SnapshotId>,
    initializer_runs: u64,
    resets: u64,
}

struct Coordinator {
    label: Option<String>,
    store: Arc<dyn StateStore>,
    initializer: Initializer,
    state: Mutex<SetupState>,
}

impl Coordinator {
    fn name(&self) -> &str {
        self.label.as_deref().unwrap_or("shared setup")
    }

    fn phase(&self) -> SetupPhase {
        self.state.lock().phase
    }

    fn update(&self, apply: impl FnOnce(&mut SetupState)) {
        apply(&mut self.state.lock());
    }

    fn require_phase(&self, allowed: &[SetupPhase], step: &str) -> SnapfixResult<()> {
        let phase = self.phase();
        if allowed.contains(&phase) {
            Ok(())
        } else {
            Err(SnapfixError::invalid_state(format!(
                "{}: step \"{}\" cannot run while {}",
                self.name(),
                step,
                phase
            )))
        }
    }

    async fn capture_initial(&self) -> SnapfixResult<()> {
        self.require_phase(&[SetupPhase::Unentered], STEP_CAPTURE_INITIAL)?;
        let id = self.store.capture().await?;
        info!(target: "snapfix::setup", setup = %self.name(), snapshot = %id, "Captured initial state");
        self.update(|s| {
            s.initial = Some(id);
            s.phase = SetupPhase::Entering;
        });
        Ok(())
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        self.require_phase(&[SetupPhase::Entering], STEP_INITIALIZE)?;
        self.update(|s| s.initializer_runs += 1);

        // Initializer errors go to the runner as they are.
        (self.initializer)().await?;

        let id = self.store.capture().await?;
        info!(target: "snapfix::setup", setup = %self.name(), snapshot = %id, "Captured post-initializer state");
        self.update(|s| {
            s.post_init = Some(id);
            s.phase = SetupPhase::Initialized;
        });
        Ok(())
    }

    async fn reset_after_test(&self, ctx: &HookContext) -> SnapfixResult<()> {
        let Some(test) = ctx.current_test() else {
            debug!(target: "snapfix::setup", setup = %self.name(), "No current test, nothing to reset");
            return Ok(());
        };
        if test.has_marker::<ResetMarker>() {
            debug!(target: "snapfix::setup", setup = %self.name(), test = %test.title(), "Already reset by a nested setup");
            return Ok(());
        }
        self.reset(test).await
    }

    async fn reset(&self, test: &TestHandle) -> SnapfixResult<()> {
        self.require_phase(
            &[
                SetupPhase::Entering,
                SetupPhase::Initialized,
                SetupPhase::PerTestReset,
            ],
            STEP_RESET_AFTER_TEST,
        )?;
        let id = self
            .state
            .lock()
            .post_init
            .clone()
            .ok_or_else(|| SnapfixError::snapshot_missing(STEP_RESET_AFTER_TEST))?;

        if !self.store.restore(&id).await? {
            return Err(SnapfixError::snapshot_rejected(id));
        }
        // The restored id is consumed from here on.
        self.update(|s| {
            s.post_init = None;
            s.phase = SetupPhase::PerTestReset;
        });

        let fresh = self.store.capture().await?;
        debug!(
            target: "snapfix::setup",
            setup = %self.name(),
            test = %test.title(),
            restored = %id,
            snapshot = %fresh,
            "Reset after test"
        );
        self.update(|s| {
            s.post_init = Some(fresh);
            s.phase = SetupPhase::Initialized;
            s.resets += 1;
        });
        test.insert_marker(ResetMarker);
        Ok(())
    }

    async fn reset_to_initial(&self) -> SnapfixResult<()> {
        self.require_phase(
            &[
                SetupPhase::Entering,
                SetupPhase::Initialized,
                SetupPhase::PerTestReset,
            ],
            STEP_RESET_TO_INITIAL,
        )?;
        let id = self
            .state
            .lock()
            .initial
            .clone()
            .ok_or_else(|| SnapfixError::snapshot_missing(STEP_RESET_TO_INITIAL))?;

        if !self.store.restore(&id).await? {
            return Err(SnapfixError::snapshot_rejected(id));
        }
        info!(target: "snapfix::setup", setup = %self.name(), snapshot = %id, "Restored initial state");
        self.update(|s| {
            s.initial = None;
            s.post_init = None;
            s.phase = SetupPhase::Exited;
        });
        Ok(())
    }
}

/// A shared-setup declaration, ready to be registered on a scope
pub struct SharedSetup {
    label: Option<String>,
    store: Arc<dyn StateStore>,
    initializer: Initializer,
}

impl SharedSetup {
    /// Declaration driving `store` and running `initializer` once per scope
    pub fn new<F, Fut>(store: Arc<dyn StateStore>, initializer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        SharedSetup {
            label: None,
            store,
            initializer: Arc::new(move || initializer().boxed()),
        }
    }

    /// Name every registered hook after `label`
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Register the four lifecycle hooks on `scope`
    pub fn register(self, scope: &mut Scope) -> SetupHandle {
        let label = self.label.clone();
        let coordinator = Arc::new(Coordinator {
            label: self.label,
            store: self.store,
            initializer: self.initializer,
            state: Mutex::new(SetupState {
                phase: SetupPhase::Unentered,
                initial: None,
                post_init: None,
                initializer_runs: 0,
                resets: 0,
            }),
        });
        let name = |step: &str| hook_name(label.as_deref(), step);

        let c = Arc::clone(&coordinator);
        scope.before_all(name(STEP_CAPTURE_INITIAL), move |_| {
            let c = Arc::clone(&c);
            async move { c.capture_initial().await.map_err(anyhow::Error::from) }
        });

        let c = Arc::clone(&coordinator);
        scope.before_all(name(STEP_INITIALIZE), move |_| {
            let c = Arc::clone(&c);
            async move { c.initialize().await }
        });

        let c = Arc::clone(&coordinator);
        scope.after_each(name(STEP_RESET_AFTER_TEST), move |ctx| {
            let c = Arc::clone(&c);
            async move { c.reset_after_test(&ctx).await.map_err(anyhow::Error::from) }
        });

        let c = Arc::clone(&coordinator);
        scope.after_all(name(STEP_RESET_TO_INITIAL), move |_| {
            let c = Arc::clone(&c);
            async move { c.reset_to_initial().await.map_err(anyhow::Error::from) }
        });

        debug!(target: "snapfix::setup", setup = %coordinator.name(), scope = %scope.title(), "Registered shared setup");
        SetupHandle { coordinator }
    }
}

impl fmt::Debug for SharedSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSetup")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a registered coordinator
#[derive(Clone)]
pub struct SetupHandle {
    coordinator: Arc<Coordinator>,
}

impl SetupHandle {
    /// Current lifecycle phase
    pub fn phase(&self) -> SetupPhase {
        self.coordinator.phase()
    }

    /// How many times the initializer was started
    pub fn initializer_runs(&self) -> u64 {
        self.coordinator.state.lock().initializer_runs
    }

    /// How many per-test restores this coordinator performed itself
    pub fn resets(&self) -> u64 {
        self.coordinator.state.lock().resets
    }

    /// Identifier of the entry state, while held
    pub fn initial_snapshot(&self) -> Option<SnapshotId> {
        self.coordinator.state.lock().initial.clone()
    }

    /// Identifier of the post-initializer state, while held
    pub fn post_init_snapshot(&self) -> Option<SnapshotId> {
        self.coordinator.state.lock().post_init.clone()
    }

    /// The declaration's label
    pub fn label(&self) -> Option<&str> {
        self.coordinator.label.as_deref()
    }
}

impl fmt::Debug for SetupHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupHandle")
            .field("label", &self.coordinator.label)
            .field("state", &*self.coordinator.state.lock())
            .finish()
    }
}
