//! Request/response store handles
//!
//! Development chains expose snapshots as two JSON-RPC methods:
//! `evm_snapshot` returns an id string, `evm_revert` takes `[id]` and returns
//! whether the id was valid. [`Provider`] is the request-capable handle shape
//! and [`RpcStore`] adapts any provider into a [`StateStore`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use snapfix_core::{SnapfixError, SnapfixResult, SnapshotId, StateStore};

/// Method capturing a snapshot
pub const METHOD_SNAPSHOT: &str = "evm_snapshot";
/// Method reverting to a snapshot
pub const METHOD_REVERT: &str = "evm_revert";

/// Request-capable handle to a remote or in-process node
#[async_trait]
pub trait Provider: Send + Sync {
    /// Issue `method` with `params` and return the JSON result
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMethod` for methods the node does not serve,
    /// `Protocol` for malformed parameters and `Unreachable` when the node
    /// cannot be contacted.
    async fn request(&self, method: &str, params: Value) -> SnapfixResult<Value>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn request(&self, method: &str, params: Value) -> SnapfixResult<Value> {
        (**self).request(method, params).await
    }
}

/// [`StateStore`] backed by a provider's snapshot methods
#[derive(Debug, Clone)]
pub struct RpcStore<P> {
    provider: P,
}

impl<P: Provider> RpcStore<P> {
    /// Wrap a provider
    pub fn new(provider: P) -> Self {
        RpcStore { provider }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider> StateStore for RpcStore<P> {
    async fn capture(&self) -> SnapfixResult<SnapshotId> {
        let result = self.provider.request(METHOD_SNAPSHOT, json!([])).await?;
        match result {
            Value::String(raw) => {
                debug!(target: "snapfix::store", snapshot = %raw, "evm_snapshot");
                Ok(SnapshotId::new(raw))
            }
            other => Err(SnapfixError::protocol(format!(
                "{} returned {} instead of a string",
                METHOD_SNAPSHOT, other
            ))),
        }
    }

    async fn restore(&self, id: &SnapshotId) -> SnapfixResult<bool> {
        let result = self
            .provider
            .request(METHOD_REVERT, json!([id.as_str()]))
            .await?;
        match result {
            Value::Bool(accepted) => {
                debug!(target: "snapfix::store", snapshot = %id, accepted, "evm_revert");
                Ok(accepted)
            }
            other => Err(SnapfixError::protocol(format!(
                "{} returned {} instead of a boolean",
                METHOD_REVERT, other
            ))),
        }
    }
}
