//! Failure propagation through the runner
//!
//! Nothing is retried and no snapshot is re-derived: every store or
//! initializer failure becomes a hook failure in the report.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;

use crate::common::*;

#[derive(Debug)]
struct DeploymentFailed(&'static str);

impl fmt::Display for DeploymentFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "deployment failed: {}", self.0)
    }
}

impl std::error::Error for DeploymentFailed {}

#[tokio::test]
async fn initializer_error_reaches_the_report_unmodified() {
    init_tracing();
    let store = recorded_memory();
    let mut suite = Suite::new("suite");
    let handle = {
        let store = Arc::clone(&store);
        SharedSetup::new(store.clone(), move || {
            // partial work before failing is rolled back on exit
            store.inner().add(KEY, 7);
            async { Err::<(), _>(anyhow::Error::new(DeploymentFailed("out of gas"))) }
        })
        .with_label("Deploy")
        .register(suite.root())
    };
    suite.root().it("direct", sees_then_bumps(&store, 7));
    suite.describe("nested", |scope| {
        scope.it("also skipped", sees_then_bumps(&store, 7));
    });

    let report = suite.run().await;

    assert_eq!(report.passed(), 0);
    assert_eq!(report.skipped(), 2);
    assert_eq!(report.hook_failures().len(), 1);
    let failure = &report.hook_failures()[0];
    assert_eq!(failure.kind, HookKind::BeforeAll);
    assert_eq!(failure.hook, "Deploy at step \"Run the initializer and snapshot\"");
    let cause = failure.error().downcast_ref::<DeploymentFailed>().unwrap();
    assert_eq!(cause.0, "out of gas");

    assert_eq!(handle.initializer_runs(), 1);
    assert_eq!(handle.post_init_snapshot(), None);
    assert_eq!(handle.phase(), SetupPhase::Exited);
    assert_eq!(store.inner().get(KEY), 0);
}

#[tokio::test]
async fn unreachable_store_on_entry_skips_the_scope() {
    let store = recorded_memory();
    store.fail_next_capture();
    let mut suite = Suite::new("suite");
    let handle = SharedSetup::new(store.clone(), add_to(&store, 1)).register(suite.root());
    suite.root().it("skipped", sees_then_bumps(&store, 1));

    let report = suite.run().await;

    assert_eq!(report.skipped(), 1);
    assert_eq!(handle.initializer_runs(), 0);
    assert_eq!(handle.phase(), SetupPhase::Unentered);

    let failures = report.hook_failures();
    assert_eq!(failures.len(), 2);
    assert!(matches!(
        failures[0].error().downcast_ref::<SnapfixError>(),
        Some(SnapfixError::Unreachable(_))
    ));
    assert_eq!(failures[1].kind, HookKind::AfterAll);
    assert!(matches!(
        failures[1].error().downcast_ref::<SnapfixError>(),
        Some(SnapfixError::InvalidState(_))
    ));
}

#[tokio::test]
async fn failed_post_initializer_capture_leaves_setup_entering() {
    let store = recorded_memory();
    let mut suite = Suite::new("suite");
    let handle = {
        let store = Arc::clone(&store);
        SharedSetup::new(store.clone(), move || {
            store.inner().add(KEY, 1);
            store.fail_next_capture();
            async { anyhow::Ok(()) }.boxed()
        })
        .register(suite.root())
    };
    suite.root().it("skipped", sees_then_bumps(&store, 1));

    let report = suite.run().await;

    assert_eq!(report.skipped(), 1);
    assert_eq!(report.hook_failures().len(), 1);
    assert_eq!(report.hook_failures()[0].hook, "Run the initializer and snapshot");
    // the exit restore still runs against the entry snapshot
    assert_eq!(handle.phase(), SetupPhase::Exited);
    assert_eq!(store.inner().get(KEY), 0);
}

#[tokio::test]
async fn failed_inner_reset_cascades_to_the_outer_setup() {
    let store = recorded_memory();
    let mut suite = Suite::new("cascade");
    let outer = SharedSetup::new(store.clone(), add_to(&store, 1))
        .with_label("outer")
        .register(suite.root());
    let mut inner = None;
    suite.describe("inner scope", |scope| {
        inner = Some(
            SharedSetup::new(store.clone(), add_to(&store, 10))
                .with_label("inner")
                .register(scope),
        );
        {
            let store = Arc::clone(&store);
            scope.it("breaks the store", move |_| {
                store.inner().add(KEY, 100);
                store.fail_next_restore();
                async { anyhow::Ok(()) }
            });
        }
        scope.it("never runs", sees_then_bumps(&store, 11));
    });
    let inner = inner.unwrap();

    let report = suite.run().await;

    assert_eq!(report.passed(), 1);
    assert_eq!(
        report.outcome("cascade inner scope never runs").map(|o| &o.status),
        Some(&TestStatus::Skipped(
            "\"inner at step \"Reset after test\"\" hook failed".to_string()
        ))
    );

    // the outer setup saw no marker and restored its own snapshot
    assert_eq!(inner.resets(), 0);
    assert_eq!(outer.resets(), 1);

    let failures = report.hook_failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].hook, "inner at step \"Reset after test\"");
    assert!(matches!(
        failures[0].error().downcast_ref::<SnapfixError>(),
        Some(SnapfixError::Unreachable(_))
    ));
    // rolling back to the outer snapshot discarded the inner entry snapshot
    assert_eq!(failures[1].hook, "inner at step \"Reset to initial state\"");
    assert!(matches!(
        failures[1].error().downcast_ref::<SnapfixError>(),
        Some(SnapfixError::SnapshotRejected { .. })
    ));

    assert_eq!(outer.phase(), SetupPhase::Exited);
    assert_eq!(inner.phase(), SetupPhase::Initialized);
    assert_eq!(store.inner().get(KEY), 0);
}
