//! Common traits for the ENS client.
//!
//! The client never talks to a node directly. Every chain interaction goes
//! through [`ChainTransport`], which keeps the resolution logic testable against
//! an in-memory chain and swappable between RPC providers.

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::error::Result;
use crate::types::{TransactionReceipt, TransactionRequest};

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN TRANSPORT TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Request/response access to a chain.
///
/// Implementations might use:
/// - JSON-RPC over HTTP (production)
/// - An in-process simulated chain (testing/development)
///
/// No ordering is assumed between independent calls.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// Executes a read-only call against `to` and returns the raw return data.
    ///
    /// Reverts surface as [`EnsError::Reverted`](crate::EnsError::Reverted).
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Submits a state-changing transaction and returns its hash.
    ///
    /// Signing and gas estimation are left to the node.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256>;

    /// Returns the receipt of a transaction, or `None` while it is pending.
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>>;

    /// Returns the accounts the node can sign for.
    async fn accounts(&self) -> Result<Vec<Address>>;
}
