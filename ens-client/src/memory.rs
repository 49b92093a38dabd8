//! In-memory chain.
//!
//! Simulates a registry contract and any number of resolver contracts behind
//! the [`ChainTransport`] interface. Suitable for tests and local development.
//!
//! # Behaviour
//!
//! - The registry lives at a fixed address; the root node is owned by the first
//!   account.
//! - Registry and resolver writes are authorized against the registry owner of
//!   the node, and revert otherwise.
//! - Resolver getters for records the resolver does not implement revert with
//!   the `invalid JUMP` message older nodes report.
//! - Addresses without a deployed contract return empty data.
//!
//! Clones share state.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::sol_types::{SolCall, SolInterface};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use ens_core::constants::INTERFACE_META_ID;
use ens_core::error::{EnsError, Result};
use ens_core::traits::ChainTransport;
use ens_core::types::{Capabilities, RecordType, TransactionReceipt, TransactionRequest};
use ens_core::{Address, Bytes, Node, B256, U256};
use ens_namehash::keccak256;

use crate::abi::{IRegistry, IResolver};

const INVALID_JUMP: &str = "VM Exception while processing transaction: invalid JUMP";
const REVERT: &str = "VM Exception while processing transaction: revert";
const NUM_ACCOUNTS: u8 = 10;

/// Behaviour of a simulated resolver contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverProfile {
    supported: Capabilities,
    faulty: Capabilities,
    introspection: bool,
    legacy_has: bool,
}

impl ResolverProfile {
    /// Public resolver: `addr`, `name` and `ABI`, with `supportsInterface`
    /// and `has`.
    pub fn public() -> Self {
        Self {
            supported: Capabilities::empty()
                .with(RecordType::Addr)
                .with(RecordType::Name)
                .with(RecordType::Abi),
            faulty: Capabilities::empty(),
            introspection: true,
            legacy_has: true,
        }
    }

    /// Removes a record getter. Calls to it revert and introspection denies it.
    pub fn without(mut self, record: RecordType) -> Self {
        self.supported = self.supported.iter().filter(|r| *r != record).collect();
        self
    }

    /// Advertises `record` but reverts when it is queried.
    pub fn faulty(mut self, record: RecordType) -> Self {
        self.supported.insert(record);
        self.faulty.insert(record);
        self
    }

    /// Drops `supportsInterface`; probes revert.
    pub fn no_introspection(mut self) -> Self {
        self.introspection = false;
        self
    }

    /// Drops the legacy `has` function; calls return no data.
    pub fn no_legacy_has(mut self) -> Self {
        self.legacy_has = false;
        self
    }
}

#[derive(Debug, Default)]
struct RegistryRecord {
    owner: Address,
    resolver: Address,
}

#[derive(Debug)]
struct ResolverState {
    profile: ResolverProfile,
    addrs: HashMap<B256, Address>,
    names: HashMap<B256, String>,
    abis: HashMap<B256, (u64, Bytes)>,
}

impl ResolverState {
    fn new(profile: ResolverProfile) -> Self {
        Self {
            profile,
            addrs: HashMap::new(),
            names: HashMap::new(),
            abis: HashMap::new(),
        }
    }

    fn getter_available(&self, record: RecordType) -> bool {
        self.profile.supported.contains(record) && !self.profile.faulty.contains(record)
    }

    fn has(&self, node: &B256, kind: &B256) -> bool {
        let end = kind.iter().position(|b| *b == 0).unwrap_or(32);
        match std::str::from_utf8(&kind[..end]) {
            Ok("addr") => self.addrs.get(node).is_some_and(|a| !a.is_zero()),
            Ok("name") => self.names.get(node).is_some_and(|n| !n.is_empty()),
            Ok("abi") => self.abis.contains_key(node),
            _ => false,
        }
    }
}

#[derive(Debug)]
struct PendingReceipt {
    receipt: TransactionReceipt,
    polls_remaining: u32,
}

#[derive(Debug)]
struct ChainState {
    registry: Address,
    accounts: Vec<Address>,
    records: HashMap<B256, RegistryRecord>,
    resolvers: HashMap<Address, ResolverState>,
    receipts: HashMap<B256, PendingReceipt>,
    mining_delay: u32,
    offline: bool,
    block_number: u64,
    nonce: u64,
}

impl ChainState {
    fn owner(&self, node: &B256) -> Address {
        self.records.get(node).map(|r| r.owner).unwrap_or(Address::ZERO)
    }

    fn authorize(&self, node: &B256, from: Address) -> Result<()> {
        if self.owner(node) == from {
            Ok(())
        } else {
            Err(revert(REVERT))
        }
    }

    fn next_address(&mut self) -> Address {
        self.nonce += 1;
        let mut seed = Vec::with_capacity(28);
        seed.extend_from_slice(self.registry.as_slice());
        seed.extend_from_slice(&self.nonce.to_be_bytes());
        Address::from_slice(&keccak256(&seed)[12..])
    }

    fn registry_call(&self, data: &[u8]) -> Result<Bytes> {
        let call = IRegistry::IRegistryCalls::abi_decode(data, true).map_err(|_| revert(INVALID_JUMP))?;

        let encoded = match call {
            IRegistry::IRegistryCalls::owner(c) => {
                IRegistry::ownerCall::abi_encode_returns(&(self.owner(&c.node),))
            }
            IRegistry::IRegistryCalls::resolver(c) => {
                let resolver = self.records.get(&c.node).map(|r| r.resolver).unwrap_or(Address::ZERO);
                IRegistry::resolverCall::abi_encode_returns(&(resolver,))
            }
            _ => Vec::new(),
        };
        Ok(encoded.into())
    }

    fn resolver_call(&self, resolver: &ResolverState, data: &[u8]) -> Result<Bytes> {
        let call = IResolver::IResolverCalls::abi_decode(data, true).map_err(|_| revert(INVALID_JUMP))?;

        let encoded = match call {
            IResolver::IResolverCalls::supportsInterface(c) => {
                if !resolver.profile.introspection {
                    return Err(revert(INVALID_JUMP));
                }
                let id: [u8; 4] = c.interfaceID.into();
                let supported = id == INTERFACE_META_ID
                    || RecordType::from_interface_id(id)
                        .is_some_and(|r| resolver.profile.supported.contains(r));
                IResolver::supportsInterfaceCall::abi_encode_returns(&(supported,))
            }
            IResolver::IResolverCalls::has(c) => {
                if !resolver.profile.legacy_has {
                    return Ok(Bytes::new());
                }
                IResolver::hasCall::abi_encode_returns(&(resolver.has(&c.node, &c.kind),))
            }
            IResolver::IResolverCalls::addr(c) => {
                if !resolver.getter_available(RecordType::Addr) {
                    return Err(revert(INVALID_JUMP));
                }
                let addr = resolver.addrs.get(&c.node).copied().unwrap_or(Address::ZERO);
                IResolver::addrCall::abi_encode_returns(&(addr,))
            }
            IResolver::IResolverCalls::name(c) => {
                if !resolver.getter_available(RecordType::Name) {
                    return Err(revert(INVALID_JUMP));
                }
                let name = resolver.names.get(&c.node).cloned().unwrap_or_default();
                IResolver::nameCall::abi_encode_returns(&(name,))
            }
            IResolver::IResolverCalls::ABI(c) => {
                if !resolver.getter_available(RecordType::Abi) {
                    return Err(revert(INVALID_JUMP));
                }
                let (content_type, data) = match resolver.abis.get(&c.node) {
                    Some((ct, data)) if U256::from(*ct) & c.contentTypes != U256::ZERO => {
                        (U256::from(*ct), data.clone())
                    }
                    _ => (U256::ZERO, Bytes::new()),
                };
                IResolver::ABICall::abi_encode_returns(&(content_type, data))
            }
            IResolver::IResolverCalls::setAddr(_) => Vec::new(),
        };
        Ok(encoded.into())
    }

    fn apply(&mut self, tx: &TransactionRequest) -> Result<()> {
        if tx.to == self.registry {
            let call = IRegistry::IRegistryCalls::abi_decode(&tx.data, true)
                .map_err(|_| revert(INVALID_JUMP))?;

            match call {
                IRegistry::IRegistryCalls::setOwner(c) => {
                    self.authorize(&c.node, tx.from)?;
                    self.records.entry(c.node).or_default().owner = c.owner;
                }
                IRegistry::IRegistryCalls::setResolver(c) => {
                    self.authorize(&c.node, tx.from)?;
                    self.records.entry(c.node).or_default().resolver = c.resolver;
                }
                IRegistry::IRegistryCalls::setSubnodeOwner(c) => {
                    self.authorize(&c.node, tx.from)?;
                    let mut combined = [0u8; 64];
                    combined[..32].copy_from_slice(c.node.as_slice());
                    combined[32..].copy_from_slice(c.label.as_slice());
                    let subnode = B256::from(keccak256(&combined));
                    self.records.entry(subnode).or_default().owner = c.owner;
                }
                IRegistry::IRegistryCalls::owner(_) | IRegistry::IRegistryCalls::resolver(_) => {}
            }
            return Ok(());
        }

        if self.resolvers.contains_key(&tx.to) {
            let call = IResolver::IResolverCalls::abi_decode(&tx.data, true)
                .map_err(|_| revert(INVALID_JUMP))?;

            if let IResolver::IResolverCalls::setAddr(c) = call {
                self.authorize(&c.node, tx.from)?;
                if let Some(resolver) = self.resolvers.get_mut(&tx.to) {
                    resolver.addrs.insert(c.node, c.addr);
                }
            }
        }
        Ok(())
    }
}

fn revert(message: &str) -> EnsError {
    EnsError::Reverted {
        message: message.into(),
    }
}

/// In-process chain implementing [`ChainTransport`].
#[derive(Clone, Debug)]
pub struct MemoryChain {
    state: Arc<RwLock<ChainState>>,
}

impl MemoryChain {
    /// Creates a chain with ten funded accounts and a deployed registry.
    pub fn new() -> Self {
        Self::with_accounts((1..=NUM_ACCOUNTS).map(Address::with_last_byte).collect())
    }

    /// Creates a chain with the given accounts. The first owns the root node.
    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        let mut records = HashMap::new();
        if let Some(first) = accounts.first() {
            records.insert(
                B256::ZERO,
                RegistryRecord {
                    owner: *first,
                    resolver: Address::ZERO,
                },
            );
        }

        let registry = Address::from_slice(&keccak256(b"registry")[12..]);
        Self {
            state: Arc::new(RwLock::new(ChainState {
                registry,
                accounts,
                records,
                resolvers: HashMap::new(),
                receipts: HashMap::new(),
                mining_delay: 0,
                offline: false,
                block_number: 0,
                nonce: 0,
            })),
        }
    }

    /// Address of the registry contract.
    pub fn registry_address(&self) -> Address {
        self.state.read().registry
    }

    /// Accounts the chain signs for.
    pub fn accounts_list(&self) -> Vec<Address> {
        self.state.read().accounts.clone()
    }

    /// Deploys a resolver contract and returns its address.
    pub fn deploy_resolver(&self, profile: ResolverProfile) -> Address {
        let mut state = self.state.write();
        let address = state.next_address();
        state.resolvers.insert(address, ResolverState::new(profile));
        debug!(%address, "Deployed resolver");
        address
    }

    /// Sets the registry owner of a node directly.
    pub fn seed_owner(&self, node: Node, owner: Address) {
        self.state.write().records.entry(node.into()).or_default().owner = owner;
    }

    /// Sets the registry resolver of a node directly.
    pub fn seed_resolver(&self, node: Node, resolver: Address) {
        self.state.write().records.entry(node.into()).or_default().resolver = resolver;
    }

    /// Stores an address record on a deployed resolver.
    pub fn seed_addr(&self, resolver: Address, node: Node, addr: Address) {
        if let Some(state) = self.state.write().resolvers.get_mut(&resolver) {
            state.addrs.insert(node.into(), addr);
        }
    }

    /// Stores a name record on a deployed resolver.
    pub fn seed_name(&self, resolver: Address, node: Node, name: impl Into<String>) {
        if let Some(state) = self.state.write().resolvers.get_mut(&resolver) {
            state.names.insert(node.into(), name.into());
        }
    }

    /// Stores an ABI record on a deployed resolver.
    pub fn seed_abi(&self, resolver: Address, node: Node, content_type: u64, data: Bytes) {
        if let Some(state) = self.state.write().resolvers.get_mut(&resolver) {
            state.abis.insert(node.into(), (content_type, data));
        }
    }

    /// Number of receipt polls that report a transaction as pending.
    pub fn set_mining_delay(&self, polls: u32) {
        self.state.write().mining_delay = polls;
    }

    /// Makes every transport call fail as if the node were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.state.write().offline = offline;
    }

    fn check_online(&self) -> Result<()> {
        if self.state.read().offline {
            Err(EnsError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainTransport for MemoryChain {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.check_online()?;
        let state = self.state.read();

        if to == state.registry {
            return state.registry_call(&data);
        }
        match state.resolvers.get(&to) {
            Some(resolver) => state.resolver_call(resolver, &data),
            None => Ok(Bytes::new()),
        }
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256> {
        self.check_online()?;
        let mut state = self.state.write();

        if !state.accounts.contains(&tx.from) {
            return Err(EnsError::Rpc {
                code: -32000,
                message: format!("sender account not recognized: {}", tx.from),
            });
        }

        state.apply(&tx)?;

        state.nonce += 1;
        state.block_number += 1;
        let mut seed = Vec::with_capacity(28);
        seed.extend_from_slice(tx.from.as_slice());
        seed.extend_from_slice(&state.nonce.to_be_bytes());
        let tx_hash = B256::from(keccak256(&seed));

        let receipt = TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(state.block_number),
            status: Some(true),
            contract_address: None,
            gas_used: None,
        };
        let polls_remaining = state.mining_delay;
        state.receipts.insert(
            tx_hash,
            PendingReceipt {
                receipt,
                polls_remaining,
            },
        );

        debug!(%tx_hash, from = %tx.from, to = %tx.to, "Mined transaction");
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        self.check_online()?;
        let mut state = self.state.write();

        match state.receipts.get_mut(&tx_hash) {
            Some(pending) if pending.polls_remaining > 0 => {
                pending.polls_remaining -= 1;
                Ok(None)
            }
            Some(pending) => Ok(Some(pending.receipt.clone())),
            None => Ok(None),
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.check_online()?;
        Ok(self.accounts_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ens_namehash::{label_hash, namehash};

    fn set_subnode_owner(chain: &MemoryChain, parent: Node, label: &str, owner: Address) -> TransactionRequest {
        let data = IRegistry::setSubnodeOwnerCall {
            node: parent.into(),
            label: label_hash(label).unwrap(),
            owner,
        }
        .abi_encode();
        TransactionRequest {
            from: chain.accounts_list()[0],
            to: chain.registry_address(),
            data: data.into(),
            gas: None,
            gas_price: None,
            value: None,
        }
    }

    #[tokio::test]
    async fn test_subnode_owner_uses_namehash() {
        let chain = MemoryChain::new();
        let owner = chain.accounts_list()[0];

        chain
            .send_transaction(set_subnode_owner(&chain, Node::ROOT, "puffs", owner))
            .await
            .unwrap();

        let state = chain.state.read();
        assert_eq!(state.owner(&namehash("puffs").unwrap().into()), owner);
    }

    #[tokio::test]
    async fn test_unauthorized_write_reverts() {
        let chain = MemoryChain::new();
        let mut tx = set_subnode_owner(&chain, Node::ROOT, "puffs", Address::repeat_byte(1));
        tx.from = chain.accounts_list()[1];

        let err = chain.send_transaction(tx).await.unwrap_err();
        assert!(matches!(err, EnsError::Reverted { .. }));
    }

    #[tokio::test]
    async fn test_unknown_sender_is_rpc_error() {
        let chain = MemoryChain::new();
        let mut tx = set_subnode_owner(&chain, Node::ROOT, "puffs", Address::repeat_byte(1));
        tx.from = Address::repeat_byte(0xaa);

        let err = chain.send_transaction(tx).await.unwrap_err();
        assert!(matches!(err, EnsError::Rpc { code: -32000, .. }));
    }

    #[tokio::test]
    async fn test_receipt_after_delay() {
        let chain = MemoryChain::new();
        chain.set_mining_delay(1);
        let owner = chain.accounts_list()[0];

        let hash = chain
            .send_transaction(set_subnode_owner(&chain, Node::ROOT, "puffs", owner))
            .await
            .unwrap();

        assert!(chain.transaction_receipt(hash).await.unwrap().is_none());
        let receipt = chain.transaction_receipt(hash).await.unwrap().unwrap();
        assert_eq!(receipt.transaction_hash, hash);
        assert_eq!(receipt.block_number, Some(1));
    }

    #[tokio::test]
    async fn test_offline_chain() {
        let chain = MemoryChain::new();
        chain.set_offline(true);
        assert!(chain.accounts().await.unwrap_err().is_recoverable());
    }

    #[tokio::test]
    async fn test_call_to_empty_address_returns_no_data() {
        let chain = MemoryChain::new();
        let data = chain.call(Address::repeat_byte(0x55), Bytes::new()).await.unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_profile_builders() {
        let profile = ResolverProfile::public().without(RecordType::Abi).faulty(RecordType::Text);
        assert!(!profile.supported.contains(RecordType::Abi));
        assert!(profile.supported.contains(RecordType::Text));
        assert!(profile.faulty.contains(RecordType::Text));
        assert!(!ResolverProfile::public().no_legacy_has().legacy_has);
    }
}
