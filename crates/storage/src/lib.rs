//! State store implementations for snapfix
//!
//! This crate provides the concrete stores the coordinator can drive:
//! - SnapshotLog: Snapshot bookkeeping with `evm_revert` semantics
//! - MemoryStore: Keyed in-memory state behind `parking_lot::RwLock`
//! - Provider / RpcStore: Request/response handles speaking `evm_snapshot`
//!   and `evm_revert`
//! - DevChain: In-memory development chain answering a small JSON-RPC subset
//! - testing: Recording and fault-injecting wrappers for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod devchain;
pub mod memory;
pub mod rpc;
pub mod snapshot;
pub mod testing;

pub use devchain::{parse_quantity, to_quantity, DevChain, DEFAULT_SENDER, GENESIS_BALANCE};
pub use memory::MemoryStore;
pub use rpc::{Provider, RpcStore, METHOD_REVERT, METHOD_SNAPSHOT};
pub use snapshot::SnapshotLog;
