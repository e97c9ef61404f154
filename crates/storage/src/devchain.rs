//! DevChain: in-memory development chain
//!
//! Answers the handful of JSON-RPC methods a fixture suite needs to move
//! value between accounts and roll the chain back:
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `eth_accounts` | `[]` | funded accounts |
//! | `eth_sendTransaction` | `[{to, value, from?}]` | transaction hash |
//! | `eth_getBalance` | `[address, block?]` | quantity |
//! | `eth_blockNumber` | `[]` | quantity |
//! | `evm_mine` | `[]` | `"0x0"` |
//! | `evm_snapshot` | `[]` | snapshot id |
//! | `evm_revert` | `[id]` | bool |
//!
//! Quantities are hex strings (`"0x1"`). Addresses are matched
//! case-insensitively. Each transaction mines its own block.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use snapfix_core::{SnapfixError, SnapfixResult, SnapshotId};

use crate::rpc::Provider;
use crate::snapshot::SnapshotLog;

/// Account funded at genesis and used when a transaction omits `from`
pub const DEFAULT_SENDER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

/// Genesis balance of [`DEFAULT_SENDER`]: 10 000 ether in wei
pub const GENESIS_BALANCE: u128 = 10_000 * 1_000_000_000_000_000_000;

#[derive(Debug, Clone, Default)]
struct ChainState {
    balances: BTreeMap<String, u128>,
    block: u64,
}

#[derive(Debug)]
struct Inner {
    state: ChainState,
    snapshots: SnapshotLog<ChainState>,
    transactions: u64,
}

#[derive(Debug, Deserialize)]
struct TransactionRequest {
    from: Option<String>,
    to: String,
    #[serde(default)]
    value: Option<String>,
}

/// In-memory development chain
#[derive(Debug)]
pub struct DevChain {
    inner: Mutex<Inner>,
}

impl DevChain {
    /// Fresh chain at block 0 with [`DEFAULT_SENDER`] funded
    pub fn new() -> Self {
        let mut state = ChainState::default();
        state
            .balances
            .insert(DEFAULT_SENDER.to_string(), GENESIS_BALANCE);
        DevChain {
            inner: Mutex::new(Inner {
                state,
                snapshots: SnapshotLog::new(),
                transactions: 0,
            }),
        }
    }

    /// Balance of `address` in wei
    pub fn balance_of(&self, address: &str) -> u128 {
        let inner = self.inner.lock();
        inner
            .state
            .balances
            .get(&normalize(address))
            .copied()
            .unwrap_or(0)
    }

    /// Current block height
    pub fn block_number(&self) -> u64 {
        self.inner.lock().state.block
    }

    /// Number of live snapshots
    pub fn snapshot_count(&self) -> usize {
        self.inner.lock().snapshots.len()
    }

    fn send_transaction(&self, params: &Value) -> SnapfixResult<Value> {
        let request: TransactionRequest = serde_json::from_value(first_param(params)?.clone())?;
        let from = normalize(request.from.as_deref().unwrap_or(DEFAULT_SENDER));
        let to = normalize(&request.to);
        let value = match request.value.as_deref() {
            Some(raw) => parse_quantity(raw)?,
            None => 0,
        };

        let mut inner = self.inner.lock();
        let available = inner.state.balances.get(&from).copied().unwrap_or(0);
        if available < value {
            return Err(SnapfixError::protocol(format!(
                "insufficient funds for transfer: {} has {} wei, needs {}",
                from, available, value
            )));
        }
        inner.state.balances.insert(from, available - value);
        *inner.state.balances.entry(to.clone()).or_insert(0) += value;
        inner.state.block += 1;
        inner.transactions += 1;

        let hash = format!("0x{:064x}", inner.transactions);
        debug!(
            target: "snapfix::store",
            to = %to,
            value = %value,
            block = inner.state.block,
            "devchain transaction mined"
        );
        Ok(Value::String(hash))
    }

    fn get_balance(&self, params: &Value) -> SnapfixResult<Value> {
        let address = first_param(params)?
            .as_str()
            .ok_or_else(|| SnapfixError::protocol("eth_getBalance expects an address string"))?;
        Ok(Value::String(to_quantity(self.balance_of(address))))
    }

    fn snapshot(&self) -> Value {
        let mut inner = self.inner.lock();
        let Inner {
            state, snapshots, ..
        } = &mut *inner;
        let id = snapshots.capture(state);
        Value::String(id.into_inner())
    }

    fn revert(&self, params: &Value) -> SnapfixResult<Value> {
        let id = first_param(params)?
            .as_str()
            .map(SnapshotId::from)
            .ok_or_else(|| SnapfixError::protocol("evm_revert expects a snapshot id string"))?;

        let mut inner = self.inner.lock();
        match inner.snapshots.revert(&id) {
            Some(saved) => {
                inner.state = saved;
                Ok(Value::Bool(true))
            }
            None => Ok(Value::Bool(false)),
        }
    }
}

impl Default for DevChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for DevChain {
    async fn request(&self, method: &str, params: Value) -> SnapfixResult<Value> {
        match method {
            "eth_accounts" => Ok(json!([DEFAULT_SENDER])),
            "eth_sendTransaction" => self.send_transaction(&params),
            "eth_getBalance" => self.get_balance(&params),
            "eth_blockNumber" => Ok(Value::String(to_quantity(self.block_number() as u128))),
            "evm_mine" => {
                self.inner.lock().state.block += 1;
                Ok(Value::String("0x0".to_string()))
            }
            "evm_snapshot" => Ok(self.snapshot()),
            "evm_revert" => self.revert(&params),
            other => Err(SnapfixError::UnsupportedMethod(other.to_string())),
        }
    }
}

fn first_param(params: &Value) -> SnapfixResult<&Value> {
    params
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| SnapfixError::protocol("expected a non-empty params array"))
}

fn normalize(address: &str) -> String {
    address.to_ascii_lowercase()
}

/// Parse a hex quantity such as `"0x1f"`
pub fn parse_quantity(raw: &str) -> SnapfixResult<u128> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| SnapfixError::protocol(format!("quantity {} is missing 0x", raw)))?;
    u128::from_str_radix(digits, 16)
        .map_err(|e| SnapfixError::protocol(format!("invalid quantity {}: {}", raw, e)))
}

/// Format a value as a hex quantity
pub fn to_quantity(value: u128) -> String {
    format!("0x{:x}", value)
}
