//! Hook naming

use std::sync::Arc;

use snapfix::{hook_name, RevertAfter, STEP_INITIALIZE, STEP_RESET_AFTER_TEST};

use crate::common::*;

fn hook_names(scope: &Scope) -> Vec<String> {
    scope.hooks().into_iter().map(|(_, name)| name.to_string()).collect()
}

#[test]
fn every_hook_embeds_the_label() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let mut scope = Scope::new("labelled");
    SharedSetup::new(Arc::clone(&store), || async { anyhow::Ok(()) })
        .with_label("Seed accounts")
        .register(&mut scope);
    RevertAfter::new(store).with_label("Seed accounts").register(&mut scope);

    let names = hook_names(&scope);
    assert_eq!(names.len(), 6);
    for name in &names {
        assert!(
            name.starts_with("Seed accounts at step \""),
            "unlabelled hook: {}",
            name
        );
    }
}

#[test]
fn unlabelled_hooks_are_bare_step_descriptions() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let mut scope = Scope::new("plain");
    SharedSetup::new(store, || async { anyhow::Ok(()) }).register(&mut scope);

    assert_eq!(
        hook_names(&scope),
        vec![
            "Take initial state snapshot",
            "Run the initializer and snapshot",
            "Reset after test",
            "Reset to initial state",
        ]
    );
}

#[tokio::test]
async fn failures_are_reported_under_the_labelled_name() {
    let store = recorded_memory();
    let mut suite = Suite::new("suite");
    SharedSetup::new(store.clone(), add_to(&store, 1))
        .with_label("Fund")
        .register(suite.root());
    {
        let store = Arc::clone(&store);
        suite.root().it("breaks the next restore", move |_| {
            store.fail_next_restore();
            async { anyhow::Ok(()) }
        });
    }

    let report = suite.run().await;

    let failure = &report.hook_failures()[0];
    assert_eq!(failure.hook, hook_name(Some("Fund"), STEP_RESET_AFTER_TEST));
    assert_eq!(failure.test.as_deref(), Some("suite breaks the next restore"));
    assert!(failure.to_string().contains("Fund at step"));
    assert_ne!(failure.hook, hook_name(Some("Fund"), STEP_INITIALIZE));
}
