//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;

pub use snapfix::testing::{RecordingStore, StoreCall};
pub use snapfix::{
    parse_quantity, DevChain, HookKind, MemoryStore, Provider, RpcStore, RunReport, Scope,
    SetupHandle, SetupPhase, SharedSetup, SharedSetupOptions, SnapfixError, StateStore, Suite,
    TestContext, TestStatus,
};

/// Account the chain suites send wei to.
pub const TEST_ACCOUNT: &str = "0x1234567890123456789012345678901234567890";

/// Key the memory-store suites mutate.
pub const KEY: &str = "value";

// ============================================================================
// Initialization
// ============================================================================

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Memory store helpers
// ============================================================================

pub type Recorded = Arc<RecordingStore<MemoryStore>>;

pub fn recorded_memory() -> Recorded {
    Arc::new(RecordingStore::new(MemoryStore::new()))
}

/// Initializer adding `delta` to [`KEY`].
pub fn add_to(
    store: &Recorded,
    delta: i64,
) -> impl Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static {
    let store = Arc::clone(store);
    move || {
        store.inner().add(KEY, delta);
        async { anyhow::Ok(()) }.boxed()
    }
}

/// Test body asserting [`KEY`] equals `expected`, then bumping it.
pub fn sees_then_bumps(
    store: &Recorded,
    expected: i64,
) -> impl Fn(TestContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static {
    let store = Arc::clone(store);
    move |_| {
        let store = Arc::clone(&store);
        async move {
            let start = store.inner().get(KEY);
            anyhow::ensure!(start == expected, "expected {} at start, saw {}", expected, start);
            let after = store.inner().add(KEY, 1);
            anyhow::ensure!(after == expected + 1, "increment lost: {}", after);
            Ok(())
        }
        .boxed()
    }
}

// ============================================================================
// Dev chain helpers
// ============================================================================

pub async fn send_one_wei(chain: &DevChain) -> anyhow::Result<()> {
    chain
        .request(
            "eth_sendTransaction",
            json!([{ "to": TEST_ACCOUNT, "value": "0x1" }]),
        )
        .await?;
    Ok(())
}

pub async fn test_account_balance(chain: &DevChain) -> anyhow::Result<u128> {
    let raw = chain
        .request("eth_getBalance", json!([TEST_ACCOUNT]))
        .await?;
    let raw = raw
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("eth_getBalance returned {}", raw))?;
    Ok(parse_quantity(raw)?)
}

/// Initializer sending one wei to [`TEST_ACCOUNT`].
pub fn send_wei_initializer(
    chain: &Arc<DevChain>,
) -> impl Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static {
    let chain = Arc::clone(chain);
    move || {
        let chain = Arc::clone(&chain);
        async move { send_one_wei(&chain).await }.boxed()
    }
}

/// The three tests every chain scope declares: the balance is `wei` at the
/// start of each, even after the middle one sends another wei.
pub fn test_with_n_wei(scope: &mut Scope, chain: &Arc<DevChain>, wei: u128) {
    let c = Arc::clone(chain);
    scope.it(format!("Should have {} wei", wei), move |_| {
        let c = Arc::clone(&c);
        async move {
            let balance = test_account_balance(&c).await?;
            anyhow::ensure!(balance == wei, "expected {} wei, found {}", wei, balance);
            Ok(())
        }
    });

    let c = Arc::clone(chain);
    scope.it(
        format!("Should have {} wei and be able to accept another one", wei),
        move |_| {
            let c = Arc::clone(&c);
            async move {
                let balance = test_account_balance(&c).await?;
                anyhow::ensure!(balance == wei, "expected {} wei, found {}", wei, balance);
                send_one_wei(&c).await?;
                let balance = test_account_balance(&c).await?;
                anyhow::ensure!(balance == wei + 1, "transfer not applied: {}", balance);
                Ok(())
            }
        },
    );

    let c = Arc::clone(chain);
    scope.it(format!("Should still have {} wei", wei), move |_| {
        let c = Arc::clone(&c);
        async move {
            let balance = test_account_balance(&c).await?;
            anyhow::ensure!(balance == wei, "expected {} wei, found {}", wei, balance);
            Ok(())
        }
    });
}

// ============================================================================
// Report helpers
// ============================================================================

/// Panic with every non-passing outcome and hook failure if the run failed.
pub fn assert_success(report: &RunReport) {
    if report.is_success() {
        return;
    }
    let mut lines = vec![report.summary()];
    for outcome in report.outcomes() {
        if outcome.status != TestStatus::Passed {
            lines.push(format!("  {}: {:?}", outcome.full_title(), outcome.status));
        }
    }
    for failure in report.hook_failures() {
        lines.push(format!("  {}", failure));
    }
    panic!("{}", lines.join("\n"));
}
