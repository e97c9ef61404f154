//! Run results
//!
//! Outcomes are recorded in execution order. Hook failures are kept next to
//! them with the original error so callers can downcast it.

use std::fmt;
use std::sync::Arc;

use crate::context::full_title;
use crate::scope::HookKind;

/// Result of one leaf test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    /// Body completed without error
    Passed,
    /// Body returned an error
    Failed(String),
    /// Body never ran
    Skipped(String),
}

/// Outcome of one leaf test
#[derive(Debug, Clone)]
pub struct TestOutcome {
    /// Enclosing scope titles, outermost first
    pub path: Vec<String>,
    /// Test title
    pub title: String,
    /// What happened
    pub status: TestStatus,
}

impl TestOutcome {
    /// Scope titles and test title joined by spaces
    pub fn full_title(&self) -> String {
        full_title(&self.path, &self.title)
    }
}

/// A hook that returned an error
#[derive(Debug, Clone)]
pub struct HookFailure {
    /// Hook kind
    pub kind: HookKind,
    /// Name the hook was registered with
    pub hook: String,
    /// Full title of the scope the hook belongs to
    pub scope: String,
    /// Full title of the test being set up or torn down, for per-test hooks
    pub test: Option<String>,
    error: Arc<anyhow::Error>,
}

impl HookFailure {
    pub(crate) fn new(
        kind: HookKind,
        hook: impl Into<String>,
        scope: impl Into<String>,
        test: Option<String>,
        error: anyhow::Error,
    ) -> Self {
        HookFailure {
            kind,
            hook: hook.into(),
            scope: scope.into(),
            test,
            error: Arc::new(error),
        }
    }

    /// The error exactly as the hook returned it
    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    /// Error message including its cause chain
    pub fn message(&self) -> String {
        format!("{:#}", self.error)
    }
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" hook", self.kind)?;
        write!(f, " \"{}\" in \"{}\"", self.hook, self.scope)?;
        if let Some(test) = &self.test {
            write!(f, " for \"{}\"", test)?;
        }
        write!(f, ": {}", self.message())
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    outcomes: Vec<TestOutcome>,
    hook_failures: Vec<HookFailure>,
}

impl RunReport {
    pub(crate) fn record_outcome(&mut self, outcome: TestOutcome) {
        self.outcomes.push(outcome);
    }

    pub(crate) fn record_hook_failure(&mut self, failure: HookFailure) {
        self.hook_failures.push(failure);
    }

    /// All outcomes in execution order
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    /// Outcome of the first test whose full title equals `full_title`
    pub fn outcome(&self, full_title: &str) -> Option<&TestOutcome> {
        self.outcomes.iter().find(|o| o.full_title() == full_title)
    }

    /// Recorded hook failures in execution order
    pub fn hook_failures(&self) -> &[HookFailure] {
        &self.hook_failures
    }

    /// Number of passed tests
    pub fn passed(&self) -> usize {
        self.count(|s| matches!(s, TestStatus::Passed))
    }

    /// Number of failed tests
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, TestStatus::Failed(_)))
    }

    /// Number of skipped tests
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, TestStatus::Skipped(_)))
    }

    /// No failed test, no skipped test and no hook failure
    pub fn is_success(&self) -> bool {
        self.hook_failures.is_empty() && self.passed() == self.outcomes.len()
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} passing, {} failing, {} skipped, {} hook failures",
            self.passed(),
            self.failed(),
            self.skipped(),
            self.hook_failures.len()
        )
    }

    fn count(&self, pred: impl Fn(&TestStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}
