//! Property tests over random scope trees
//!
//! A chain of nested scopes, some of which declare a shared setup, with a
//! random number of leaf tests at the bottom. Each setup adds 1, so every
//! test must start from the number of setups around it.

use std::sync::Arc;

use proptest::prelude::*;

use crate::common::*;

#[derive(Debug, Clone)]
struct Plan {
    /// Whether each level, outermost first, declares a shared setup
    setups: Vec<bool>,
    /// Amount each leaf test adds on top of the setup state
    bumps: Vec<i64>,
}

fn plan() -> impl Strategy<Value = Plan> {
    (
        prop::collection::vec(any::<bool>(), 1..5),
        prop::collection::vec(1i64..50, 0..6),
    )
        .prop_filter("at least one setup", |(setups, _)| setups.contains(&true))
        .prop_map(|(setups, bumps)| Plan { setups, bumps })
}

fn build(
    scope: &mut Scope,
    level: usize,
    plan: &Plan,
    store: &Recorded,
    handles: &mut Vec<SetupHandle>,
) {
    if plan.setups[level] {
        handles.push(SharedSetup::new(store.clone(), add_to(store, 1)).register(scope));
    }
    if level + 1 < plan.setups.len() {
        scope.describe(format!("level {}", level + 1), |child| {
            build(child, level + 1, plan, store, handles)
        });
        return;
    }

    let expected = handles.len() as i64;
    for (i, bump) in plan.bumps.iter().copied().enumerate() {
        let store = Arc::clone(store);
        scope.it(format!("leaf {}", i), move |_| {
            let store = Arc::clone(&store);
            async move {
                let start = store.inner().get(KEY);
                anyhow::ensure!(start == expected, "started at {}, expected {}", start, expected);
                store.inner().add(KEY, bump);
                Ok(())
            }
        });
    }
}

fn run(plan: &Plan) -> (Recorded, Vec<SetupHandle>, RunReport) {
    let store = recorded_memory();
    let mut handles = Vec::new();
    let mut suite = Suite::new("level 0");
    build(suite.root(), 0, plan, &store, &mut handles);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let report = runtime.block_on(suite.run());
    (store, handles, report)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn initializers_run_once_per_scope(plan in plan()) {
        let (_, handles, report) = run(&plan);
        prop_assert!(report.is_success(), "{}", report.summary());
        for handle in &handles {
            prop_assert_eq!(handle.initializer_runs(), 1);
        }
    }

    #[test]
    fn every_test_starts_from_the_setup_state(plan in plan()) {
        let (_, _, report) = run(&plan);
        prop_assert_eq!(report.passed(), plan.bumps.len());
        prop_assert_eq!(report.failed(), 0);
    }

    #[test]
    fn only_the_innermost_setup_restores(plan in plan()) {
        let (store, handles, _) = run(&plan);
        let tests = plan.bumps.len() as u64;
        let (innermost, outer) = handles.split_last().unwrap();
        prop_assert_eq!(innermost.resets(), tests);
        for handle in outer {
            prop_assert_eq!(handle.resets(), 0);
        }
        // one restore per test plus one scope exit per setup
        prop_assert_eq!(store.restore_count(), tests as usize + handles.len());
    }

    #[test]
    fn scope_exit_restores_the_entry_state(plan in plan(), start in -100i64..100) {
        let store = recorded_memory();
        store.inner().set(KEY, start);
        let mut handles = Vec::new();
        let mut suite = Suite::new("level 0");
        let nested_only = Plan { setups: plan.setups.clone(), bumps: Vec::new() };
        build(suite.root(), 0, &nested_only, &store, &mut handles);
        for (i, bump) in plan.bumps.iter().copied().enumerate() {
            let store = Arc::clone(&store);
            suite.root().it(format!("mutates {}", i), move |_| {
                store.inner().add(KEY, bump);
                async { anyhow::Ok(()) }
            });
        }

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let report = runtime.block_on(suite.run());

        prop_assert!(report.hook_failures().is_empty());
        for handle in &handles {
            prop_assert_eq!(handle.phase(), SetupPhase::Exited);
        }
        if plan.setups[0] {
            prop_assert_eq!(store.inner().get(KEY), start);
            prop_assert_eq!(store.inner().snapshot_count(), 0);
        }
    }
}
