//! Resolver contract wrapper.
//!
//! A [`Resolver`] is bound to one node and the resolver contract the registry
//! names for it. Record getters classify failures the same way:
//!
//! - empty return data means the contract has no such function (or no code)
//!   and yields `NameNotFound`;
//! - a revert triggers an EIP-165 probe for the record's interface. A resolver
//!   that reports the record unsupported yields `NameNotFound`; otherwise the
//!   revert is returned unmodified as [`EnsError::Reverted`].

use std::sync::Arc;

use alloy::sol_types::SolCall;
use futures::future::join_all;
use tracing::{debug, instrument};

use ens_core::constants::ABI_CONTENT_JSON;
use ens_core::error::{EnsError, Result};
use ens_core::traits::ChainTransport;
use ens_core::types::{Capabilities, ContractAbi, RecordType, TxOptions};
use ens_core::{Address, Node, B256, U256};
use ens_namehash::{reverse_name, reverse_node};

use crate::abi::IResolver;
use crate::registry::Registry;
use crate::tx::submit;

/// Handle to a resolver contract for one node.
#[derive(Clone)]
pub struct Resolver {
    transport: Arc<dyn ChainTransport>,
    registry: Registry,
    address: Address,
    node: Node,
    target: String,
    not_found_message: String,
}

impl Resolver {
    pub(crate) fn new(
        registry: Registry,
        transport: Arc<dyn ChainTransport>,
        address: Address,
        node: Node,
        target: String,
        not_found_message: String,
    ) -> Self {
        Self {
            transport,
            registry,
            address,
            node,
            target,
            not_found_message,
        }
    }

    /// Resolver contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Node this handle queries.
    pub fn node(&self) -> Node {
        self.node
    }

    /// Name (or node hex) the handle was obtained for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Forward address record. May be zero if the record is unset.
    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn addr(&self) -> Result<Address> {
        let call = IResolver::addrCall { node: self.node.into() };
        Ok(self.query(call, RecordType::Addr).await?._0)
    }

    /// Reverse name record. May be empty if the record is unset.
    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn name(&self) -> Result<String> {
        let call = IResolver::nameCall { node: self.node.into() };
        Ok(self.query(call, RecordType::Name).await?._0)
    }

    /// ABI record matching any of the `content_types` bits.
    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn abi(&self, content_types: u64) -> Result<ContractAbi> {
        let call = IResolver::ABICall {
            node: self.node.into(),
            contentTypes: U256::from(content_types),
        };
        let ret = self.query(call, RecordType::Abi).await?;

        let content_type = u64::try_from(ret._0)
            .map_err(|_| EnsError::Decode(format!("ABI content type {} out of range", ret._0)))?;
        Ok(ContractAbi {
            content_type,
            data: ret._1,
        })
    }

    /// JSON ABI of the name.
    ///
    /// When the name carries no ABI record, or its resolver does not
    /// implement ABI records at all, the ABI stored on the reverse record of
    /// the name's address is used instead.
    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn abi_json(&self) -> Result<serde_json::Value> {
        match self.abi(ABI_CONTENT_JSON).await {
            Ok(own) if !own.is_empty() => return own.json(),
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                debug!(resolver = %self.address, "Resolver has no ABI record support");
            }
            Err(e) => return Err(e),
        }

        let reverse = self.reverse_resolver().await?;
        debug!(resolver = %reverse.address(), "Falling back to reverse record ABI");

        let fallback = reverse.abi(ABI_CONTENT_JSON).await?;
        if fallback.is_empty() {
            return Err(self.not_found());
        }
        fallback.json()
    }

    /// Resolver of the reverse record of this name's address.
    ///
    /// # Errors
    ///
    /// `NameNotFound` if the address record is unset or the reverse record has
    /// no resolver.
    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn reverse_resolver(&self) -> Result<Resolver> {
        let address = self.addr().await?;
        if address.is_zero() {
            return Err(self.not_found());
        }

        let node = reverse_node(&address);
        let resolver_address = self.registry.resolver(node).await?;
        if resolver_address.is_zero() {
            return Err(self.not_found());
        }

        Ok(Resolver::new(
            self.registry.clone(),
            Arc::clone(&self.transport),
            resolver_address,
            node,
            reverse_name(&address),
            self.not_found_message.clone(),
        ))
    }

    /// Legacy `has(node, kind)` check.
    ///
    /// `kind` is right-padded into a `bytes32`. A resolver without the
    /// function answers `false`; reverts propagate.
    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn has(&self, kind: &str) -> Result<bool> {
        let raw_kind = kind.as_bytes();
        if raw_kind.len() > 32 {
            return Err(EnsError::InvalidRecordKind(kind.to_string()));
        }
        let mut word = [0u8; 32];
        word[..raw_kind.len()].copy_from_slice(raw_kind);

        let call = IResolver::hasCall {
            node: self.node.into(),
            kind: B256::from(word),
        };
        let raw = self.transport.call(self.address, call.abi_encode().into()).await?;
        if raw.is_empty() {
            return Ok(false);
        }

        let has = IResolver::hasCall::abi_decode_returns(&raw, true)
            .map_err(|e| EnsError::Decode(format!("has: {e}")))?
            ._0;
        Ok(has)
    }

    /// Returns true if the resolver advertises `record` through EIP-165.
    ///
    /// Resolvers without `supportsInterface` support nothing.
    pub async fn supports(&self, record: RecordType) -> Result<bool> {
        Ok(self.introspect(record).await?.unwrap_or(false))
    }

    /// Probes every record type concurrently.
    #[instrument(skip(self), fields(resolver = %self.address))]
    pub async fn capabilities(&self) -> Result<Capabilities> {
        let probes = RecordType::ALL.map(|record| async move {
            self.supports(record).await.map(|supported| (record, supported))
        });

        let mut caps = Capabilities::empty();
        for result in join_all(probes).await {
            let (record, supported) = result?;
            if supported {
                caps.insert(record);
            }
        }

        debug!(%caps, "Resolver capabilities");
        Ok(caps)
    }

    /// Sets the forward address record.
    #[instrument(skip(self, opts), fields(target = %self.target))]
    pub async fn set_addr(&self, addr: Address, opts: &TxOptions) -> Result<B256> {
        let data = IResolver::setAddrCall {
            node: self.node.into(),
            addr,
        }
        .abi_encode();
        submit(self.transport.as_ref(), self.address, data.into(), opts).await
    }

    /// Calls `supportsInterface`; `None` if the resolver cannot answer.
    async fn introspect(&self, record: RecordType) -> Result<Option<bool>> {
        let call = IResolver::supportsInterfaceCall {
            interfaceID: record.interface_id().into(),
        };

        match self.transport.call(self.address, call.abi_encode().into()).await {
            Ok(raw) if raw.is_empty() => Ok(None),
            Ok(raw) => {
                let supported = IResolver::supportsInterfaceCall::abi_decode_returns(&raw, true)
                    .map_err(|e| EnsError::Decode(format!("supportsInterface: {e}")))?
                    ._0;
                Ok(Some(supported))
            }
            Err(EnsError::Reverted { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn query<C: SolCall>(&self, call: C, record: RecordType) -> Result<C::Return> {
        match self.transport.call(self.address, call.abi_encode().into()).await {
            Ok(raw) if raw.is_empty() => Err(self.not_found()),
            Ok(raw) => C::abi_decode_returns(&raw, true)
                .map_err(|e| EnsError::Decode(format!("{record}: {e}"))),
            Err(err @ EnsError::Reverted { .. }) => Err(self.classify_revert(err, record).await),
            Err(err) => Err(err),
        }
    }

    async fn classify_revert(&self, err: EnsError, record: RecordType) -> EnsError {
        match self.introspect(record).await {
            Ok(Some(false)) => {
                debug!(%record, "Resolver does not support record");
                self.not_found()
            }
            _ => err,
        }
    }

    fn not_found(&self) -> EnsError {
        EnsError::not_found(self.target.clone(), self.not_found_message.clone())
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("address", &self.address)
            .field("node", &self.node)
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryChain, ResolverProfile};
    use ens_core::constants::DEFAULT_NOT_FOUND_MESSAGE;
    use ens_core::{Bytes, ErrorKind};
    use ens_namehash::namehash;

    fn resolver_for(chain: &MemoryChain, address: Address, name: &str) -> Resolver {
        let transport: Arc<dyn ChainTransport> = Arc::new(chain.clone());
        let registry = Registry::new(Arc::clone(&transport), chain.registry_address());
        Resolver::new(
            registry,
            transport,
            address,
            namehash(name).unwrap(),
            name.to_string(),
            DEFAULT_NOT_FOUND_MESSAGE.to_string(),
        )
    }

    #[tokio::test]
    async fn test_addr_and_name() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public());
        let node = namehash("foo.puffs").unwrap();
        chain.seed_addr(resolver_address, node, Address::repeat_byte(0x22));
        chain.seed_name(resolver_address, node, "foo.puffs");

        let resolver = resolver_for(&chain, resolver_address, "foo.puffs");
        assert_eq!(resolver.addr().await.unwrap(), Address::repeat_byte(0x22));
        assert_eq!(resolver.name().await.unwrap(), "foo.puffs");
    }

    #[tokio::test]
    async fn test_unadvertised_revert_is_not_found() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public().without(RecordType::Addr));

        let err = resolver_for(&chain, resolver_address, "foo.puffs").addr().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameNotFound);
        assert_eq!(err.to_string(), DEFAULT_NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_advertised_revert_is_ambiguous() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public().faulty(RecordType::Addr));

        let err = resolver_for(&chain, resolver_address, "foo.puffs").addr().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
        assert!(err.to_string().contains("invalid JUMP"));
    }

    #[tokio::test]
    async fn test_revert_without_introspection_is_ambiguous() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(
            ResolverProfile::public()
                .without(RecordType::Name)
                .no_introspection(),
        );

        let err = resolver_for(&chain, resolver_address, "foo.puffs").name().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
    }

    #[tokio::test]
    async fn test_resolver_without_code_is_not_found() {
        let chain = MemoryChain::new();
        let err = resolver_for(&chain, Address::repeat_byte(0x77), "foo.puffs")
            .addr()
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public());
        chain.set_offline(true);

        let err = resolver_for(&chain, resolver_address, "foo.puffs").addr().await.unwrap_err();
        assert!(matches!(err, EnsError::Transport(_)));
    }

    #[tokio::test]
    async fn test_has() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public());
        chain.seed_addr(resolver_address, namehash("foo.puffs").unwrap(), Address::repeat_byte(1));

        let resolver = resolver_for(&chain, resolver_address, "foo.puffs");
        assert!(resolver.has("addr").await.unwrap());
        assert!(!resolver.has("blah").await.unwrap());

        let err = resolver.has(&"x".repeat(33)).await.unwrap_err();
        assert!(matches!(err, EnsError::InvalidRecordKind(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidName);
    }

    #[tokio::test]
    async fn test_capabilities() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public().without(RecordType::Abi));

        let resolver = resolver_for(&chain, resolver_address, "foo.puffs");
        let caps = resolver.capabilities().await.unwrap();
        assert!(caps.contains(RecordType::Addr));
        assert!(caps.contains(RecordType::Name));
        assert!(!caps.contains(RecordType::Abi));
        assert!(!resolver.supports(RecordType::Text).await.unwrap());
    }

    #[tokio::test]
    async fn test_no_introspection_supports_nothing() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public().no_introspection());

        let caps = resolver_for(&chain, resolver_address, "foo.puffs").capabilities().await.unwrap();
        assert!(caps.is_empty());
    }

    #[tokio::test]
    async fn test_abi_record() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public());
        let node = namehash("foo.puffs").unwrap();
        chain.seed_abi(resolver_address, node, ABI_CONTENT_JSON, Bytes::from_static(b"[{\"type\":\"fallback\"}]"));

        let resolver = resolver_for(&chain, resolver_address, "foo.puffs");
        let abi = resolver.abi(ABI_CONTENT_JSON).await.unwrap();
        assert_eq!(abi.content_type, ABI_CONTENT_JSON);

        let json = resolver.abi_json().await.unwrap();
        assert_eq!(json[0]["type"], "fallback");
    }

    #[tokio::test]
    async fn test_abi_missing_is_not_found() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public());

        let resolver = resolver_for(&chain, resolver_address, "foo.puffs");
        assert!(resolver.abi(ABI_CONTENT_JSON).await.unwrap().is_empty());
        assert!(resolver.abi_json().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_abi_json_falls_back_when_resolver_lacks_abi() {
        let chain = MemoryChain::new();
        let name_resolver =
            chain.deploy_resolver(ResolverProfile::public().without(RecordType::Abi));
        let reverse_resolver = chain.deploy_resolver(ResolverProfile::public());
        let target = Address::repeat_byte(0x44);
        chain.seed_addr(name_resolver, namehash("baz.puffs").unwrap(), target);

        let reverse = reverse_node(&target);
        chain.seed_resolver(reverse, reverse_resolver);
        chain.seed_abi(
            reverse_resolver,
            reverse,
            ABI_CONTENT_JSON,
            Bytes::from_static(b"[{\"name\":\"test\",\"type\":\"function\"}]"),
        );

        let resolver = resolver_for(&chain, name_resolver, "baz.puffs");
        assert!(resolver.abi(ABI_CONTENT_JSON).await.unwrap_err().is_not_found());

        let json = resolver.abi_json().await.unwrap();
        assert_eq!(json[0]["name"], "test");
    }

    #[tokio::test]
    async fn test_set_addr() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public());
        let owner = chain.accounts_list()[0];
        chain.seed_owner(namehash("foo.puffs").unwrap(), owner);

        let resolver = resolver_for(&chain, resolver_address, "foo.puffs");
        resolver
            .set_addr(Address::repeat_byte(0x33), &TxOptions::default())
            .await
            .unwrap();
        assert_eq!(resolver.addr().await.unwrap(), Address::repeat_byte(0x33));
    }

    #[tokio::test]
    async fn test_set_addr_requires_ownership() {
        let chain = MemoryChain::new();
        let resolver_address = chain.deploy_resolver(ResolverProfile::public());
        chain.seed_owner(namehash("foo.puffs").unwrap(), chain.accounts_list()[1]);

        let err = resolver_for(&chain, resolver_address, "foo.puffs")
            .set_addr(Address::repeat_byte(0x33), &TxOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
    }
}
