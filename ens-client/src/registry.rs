//! Registry contract wrapper.

use std::sync::Arc;

use alloy::sol_types::SolCall;
use tracing::{debug, instrument};

use ens_core::error::{EnsError, Result};
use ens_core::traits::ChainTransport;
use ens_core::types::TxOptions;
use ens_core::{Address, Node, B256};

use crate::abi::IRegistry;
use crate::tx::submit;

/// Handle to the registry contract at a fixed address.
///
/// Reads go through `eth_call`; writes are submitted with
/// `eth_sendTransaction` and return the transaction hash without waiting.
#[derive(Clone)]
pub struct Registry {
    transport: Arc<dyn ChainTransport>,
    address: Address,
}

impl Registry {
    /// Creates a registry handle.
    pub fn new(transport: Arc<dyn ChainTransport>, address: Address) -> Self {
        Self { transport, address }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Owner of `node`. Unowned nodes return the zero address.
    #[instrument(skip(self), fields(registry = %self.address))]
    pub async fn owner(&self, node: Node) -> Result<Address> {
        let data = IRegistry::ownerCall { node: node.into() }.abi_encode();
        let raw = self.transport.call(self.address, data.into()).await?;
        if raw.is_empty() {
            return Err(EnsError::Decode(format!("registry {} returned no data", self.address)));
        }

        let owner = IRegistry::ownerCall::abi_decode_returns(&raw, true)
            .map_err(|e| EnsError::Decode(format!("owner: {e}")))?
            ._0;
        debug!(%owner, "registry owner");
        Ok(owner)
    }

    /// Resolver of `node`. No resolver is the zero address.
    #[instrument(skip(self), fields(registry = %self.address))]
    pub async fn resolver(&self, node: Node) -> Result<Address> {
        let data = IRegistry::resolverCall { node: node.into() }.abi_encode();
        let raw = self.transport.call(self.address, data.into()).await?;
        if raw.is_empty() {
            return Err(EnsError::Decode(format!("registry {} returned no data", self.address)));
        }

        let resolver = IRegistry::resolverCall::abi_decode_returns(&raw, true)
            .map_err(|e| EnsError::Decode(format!("resolver: {e}")))?
            ._0;
        debug!(%resolver, "registry resolver");
        Ok(resolver)
    }

    /// Transfers ownership of `node`.
    pub async fn set_owner(&self, node: Node, owner: Address, opts: &TxOptions) -> Result<B256> {
        let data = IRegistry::setOwnerCall { node: node.into(), owner }.abi_encode();
        submit(self.transport.as_ref(), self.address, data.into(), opts).await
    }

    /// Points `node` at a resolver contract.
    pub async fn set_resolver(
        &self,
        node: Node,
        resolver: Address,
        opts: &TxOptions,
    ) -> Result<B256> {
        let data = IRegistry::setResolverCall { node: node.into(), resolver }.abi_encode();
        submit(self.transport.as_ref(), self.address, data.into(), opts).await
    }

    /// Assigns ownership of the subnode `keccak256(parent ++ label)`.
    pub async fn set_subnode_owner(
        &self,
        parent: Node,
        label: B256,
        owner: Address,
        opts: &TxOptions,
    ) -> Result<B256> {
        let data = IRegistry::setSubnodeOwnerCall {
            node: parent.into(),
            label,
            owner,
        }
        .abi_encode();
        submit(self.transport.as_ref(), self.address, data.into(), opts).await
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("address", &self.address).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryChain;
    use ens_namehash::{label_hash, namehash};

    #[tokio::test]
    async fn test_root_owned_by_first_account() {
        let chain = MemoryChain::new();
        let registry = Registry::new(Arc::new(chain.clone()), chain.registry_address());

        assert_eq!(registry.owner(Node::ROOT).await.unwrap(), chain.accounts_list()[0]);
        assert_eq!(registry.resolver(Node::ROOT).await.unwrap(), Address::ZERO);
    }

    #[tokio::test]
    async fn test_set_subnode_owner_then_owner() {
        let chain = MemoryChain::new();
        let registry = Registry::new(Arc::new(chain.clone()), chain.registry_address());
        let alice = chain.accounts_list()[1];

        registry
            .set_subnode_owner(Node::ROOT, label_hash("puffs").unwrap(), alice, &TxOptions::default())
            .await
            .unwrap();

        assert_eq!(registry.owner(namehash("puffs").unwrap()).await.unwrap(), alice);
    }

    #[tokio::test]
    async fn test_registry_without_code_is_decode_error() {
        let chain = MemoryChain::new();
        let registry = Registry::new(Arc::new(chain), Address::repeat_byte(0x99));

        let err = registry.owner(Node::ROOT).await.unwrap_err();
        assert!(matches!(err, EnsError::Decode(_)));
    }
}
