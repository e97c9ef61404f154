//! Suite execution
//!
//! Execution is strictly sequential: one hook or test body is awaited to
//! completion before the next starts, so hooks sharing state through a
//! [`TestHandle`] never race.
//!
//! # Failure handling
//!
//! - A failing `before_all` skips every test below its scope; the scope's
//!   `after_all` hooks still run.
//! - A failing `before_each` skips that test's body; its `after_each` hooks
//!   still run.
//! - A failing `after_each` does not stop the remaining `after_each` hooks
//!   for the same test, but the rest of the test's innermost scope is
//!   skipped.
//! - All `after_all` hooks of an entered scope run, whatever happened.
//! - With `bail`, the first failure skips everything not yet started.
//!
//! Teardown hooks (`after_each`, `after_all`) registered on the same scope
//! run in reverse registration order, so the most recently declared helper
//! tears down first.

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::context::{full_title, HookContext, TestContext, TestHandle};
use crate::report::{HookFailure, RunReport, TestOutcome, TestStatus};
use crate::scope::{Hook, HookKind, Scope, TestCase};

/// A root scope plus the configuration used to run it
#[derive(Debug)]
pub struct Suite {
    root: Scope,
    config: RunnerConfig,
}

impl Suite {
    /// Suite with an empty root scope titled `title`
    pub fn new(title: impl Into<String>) -> Self {
        Suite {
            root: Scope::new(title),
            config: RunnerConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration in use
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Root scope, for declaring tests and hooks at the top level
    pub fn root(&mut self) -> &mut Scope {
        &mut self.root
    }

    /// Declare a top-level scope
    pub fn describe<F>(&mut self, title: impl Into<String>, build: F) -> &mut Self
    where
        F: FnOnce(&mut Scope),
    {
        self.root.describe(title, build);
        self
    }

    /// Run every scope and test
    pub async fn run(&self) -> RunReport {
        info!(
            target: "snapfix::runner",
            suite = %self.root.title(),
            tests = self.root.test_count(),
            "Suite started"
        );
        let mut execution = Execution {
            config: &self.config,
            report: RunReport::default(),
            bailed: false,
        };
        execution.run_scope(Vec::new(), &self.root).await;

        let report = execution.report;
        info!(target: "snapfix::runner", summary = %report.summary(), "Suite finished");
        report
    }
}

struct Execution<'a> {
    config: &'a RunnerConfig,
    report: RunReport,
    bailed: bool,
}

impl<'a> Execution<'a> {
    fn run_scope<'s>(
        &'s mut self,
        ancestors: Vec<&'a Scope>,
        scope: &'a Scope,
    ) -> BoxFuture<'s, ()>
    where
        'a: 's,
    {
        Box::pin(async move {
            let mut path: Vec<String> = ancestors.iter().map(|s| s.title().to_string()).collect();
            path.push(scope.title().to_string());
            let scope_title = path.join(" ");

            if self.bailed {
                self.skip_subtree(&path, scope, "bail");
                return;
            }
            debug!(target: "snapfix::runner", scope = %scope_title, "Entering scope");

            let mut aborted: Option<String> = None;
            for hook in scope.hooks_of(HookKind::BeforeAll) {
                let ctx = HookContext::new(path.clone(), hook.name.clone(), None);
                if !self.run_hook(hook, ctx, &scope_title, None).await {
                    aborted = Some(format!("\"{}\" hook failed", hook.name));
                    break;
                }
            }

            let mut chain = ancestors;
            chain.push(scope);

            for test in &scope.tests {
                if let Some(reason) = aborted.as_deref().or(self.bailed.then_some("bail")) {
                    self.skip_test(&path, test, reason);
                    continue;
                }
                if !self.config.selects(&full_title(&path, &test.title)) {
                    continue;
                }
                if let Some(reason) = self.run_test(&chain, &path, test).await {
                    aborted = Some(reason);
                }
            }

            for child in &scope.scopes {
                if let Some(reason) = aborted.as_deref() {
                    let mut child_path = path.clone();
                    child_path.push(child.title().to_string());
                    self.skip_subtree(&child_path, child, reason);
                    continue;
                }
                self.run_scope(chain.clone(), child).await;
            }

            for hook in scope.hooks_of(HookKind::AfterAll).rev() {
                let ctx = HookContext::new(path.clone(), hook.name.clone(), None);
                self.run_hook(hook, ctx, &scope_title, None).await;
            }
            debug!(target: "snapfix::runner", scope = %scope_title, "Leaving scope");
        })
    }

    /// Runs one leaf test with its per-test hooks. Returns an abort reason
    /// if an `after_each` hook failed.
    async fn run_test(
        &mut self,
        chain: &[&'a Scope],
        path: &[String],
        test: &'a TestCase,
    ) -> Option<String> {
        let handle = TestHandle::new(path.to_vec(), test.title.clone());
        let test_title = handle.full_title();
        let mut setup_failed: Option<String> = None;

        'setup: for (depth, scope) in chain.iter().enumerate() {
            for hook in scope.hooks_of(HookKind::BeforeEach) {
                let scope_path = path[..=depth].to_vec();
                let scope_title = scope_path.join(" ");
                let ctx = HookContext::new(scope_path, hook.name.clone(), Some(handle.clone()));
                if !self
                    .run_hook(hook, ctx, &scope_title, Some(test_title.clone()))
                    .await
                {
                    setup_failed = Some(format!("\"{}\" hook failed", hook.name));
                    break 'setup;
                }
            }
        }

        let status = match setup_failed {
            Some(reason) => TestStatus::Skipped(reason),
            None => {
                debug!(target: "snapfix::runner", test = %test_title, "Running test");
                match (test.body)(TestContext::new(handle.clone())).await {
                    Ok(()) => TestStatus::Passed,
                    Err(e) => {
                        warn!(target: "snapfix::runner", test = %test_title, error = %format!("{:#}", e), "Test failed");
                        TestStatus::Failed(format!("{:#}", e))
                    }
                }
            }
        };
        if matches!(status, TestStatus::Failed(_)) && self.config.bail {
            self.bailed = true;
        }
        self.report.record_outcome(TestOutcome {
            path: path.to_vec(),
            title: test.title.clone(),
            status,
        });

        let mut abort = None;
        for (depth, scope) in chain.iter().enumerate().rev() {
            for hook in scope.hooks_of(HookKind::AfterEach).rev() {
                let scope_path = path[..=depth].to_vec();
                let scope_title = scope_path.join(" ");
                let ctx = HookContext::new(scope_path, hook.name.clone(), Some(handle.clone()));
                if !self
                    .run_hook(hook, ctx, &scope_title, Some(test_title.clone()))
                    .await
                    && abort.is_none()
                {
                    abort = Some(format!("\"{}\" hook failed", hook.name));
                }
            }
        }
        abort
    }

    /// Runs a hook, recording a failure. Returns whether it succeeded.
    async fn run_hook(
        &mut self,
        hook: &Hook,
        ctx: HookContext,
        scope_title: &str,
        test: Option<String>,
    ) -> bool {
        debug!(target: "snapfix::runner", kind = %hook.kind, hook = %hook.name, scope = %scope_title, "Running hook");
        match (hook.run)(ctx).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    target: "snapfix::runner",
                    kind = %hook.kind,
                    hook = %hook.name,
                    scope = %scope_title,
                    error = %format!("{:#}", e),
                    "Hook failed"
                );
                self.report
                    .record_hook_failure(HookFailure::new(hook.kind, hook.name.clone(), scope_title, test, e));
                if self.config.bail {
                    self.bailed = true;
                }
                false
            }
        }
    }

    fn skip_test(&mut self, path: &[String], test: &TestCase, reason: &str) {
        if !self.config.selects(&full_title(path, &test.title)) {
            return;
        }
        self.report.record_outcome(TestOutcome {
            path: path.to_vec(),
            title: test.title.clone(),
            status: TestStatus::Skipped(reason.to_string()),
        });
    }

    fn skip_subtree(&mut self, path: &[String], scope: &Scope, reason: &str) {
        for test in &scope.tests {
            self.skip_test(path, test, reason);
        }
        for child in &scope.scopes {
            let mut child_path = path.to_vec();
            child_path.push(child.title().to_string());
            self.skip_subtree(&child_path, child, reason);
        }
    }
}
