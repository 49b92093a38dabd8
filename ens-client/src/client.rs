//! Resolution orchestrator.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use ens_core::error::{EnsError, Result};
use ens_core::traits::ChainTransport;
use ens_core::types::{TransactionReceipt, TxOptions};
use ens_core::{Address, Node, B256};
use ens_namehash::{label_hash, namehash, reverse_node, split_name};

use crate::config::{AbsentPolicy, EnsConfig, NetworkTable};
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::tx;

/// ENS client.
///
/// Normalizes names, asks the registry for the responsible resolver, and
/// queries that resolver. Holds no cache: every call reads the chain.
///
/// # Example
///
/// ```rust,ignore
/// let ens = Ens::builder()
///     .transport(HttpTransport::new("http://localhost:8545")?)
///     .network("1")
///     .build()?;
///
/// let address = ens.lookup("foo.eth").await?;
/// ```
#[derive(Clone)]
pub struct Ens {
    transport: Arc<dyn ChainTransport>,
    registry: Registry,
    config: EnsConfig,
}

impl Ens {
    /// Starts building a client.
    pub fn builder() -> EnsBuilder {
        EnsBuilder::default()
    }

    /// Creates a client from a transport and configuration.
    ///
    /// # Errors
    ///
    /// [`EnsError::Config`] if the configuration names no usable registry.
    pub fn new(transport: Arc<dyn ChainTransport>, config: EnsConfig) -> Result<Self> {
        let registry_address = config.registry()?;
        let registry = Registry::new(Arc::clone(&transport), registry_address);
        debug!(registry = %registry_address, "ENS client ready");

        Ok(Self {
            transport,
            registry,
            config,
        })
    }

    /// Address of the registry contract in use.
    pub fn registry_address(&self) -> Address {
        self.registry.address()
    }

    /// Registry contract handle.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &EnsConfig {
        &self.config
    }

    /// Namehash of `name`. Pure; no network call.
    pub fn namehash(&self, name: &str) -> Result<Node> {
        namehash(name)
    }

    /// Owner of `name`.
    ///
    /// # Errors
    ///
    /// `NameNotFound` if the name has no owner.
    #[instrument(skip(self))]
    pub async fn owner(&self, name: &str) -> Result<Address> {
        let node = self.query_node(name)?;
        let owner = self.registry.owner(node).await?;
        if owner.is_zero() {
            return Err(self.not_found(name));
        }
        Ok(owner)
    }

    /// Resolver contract address of `name`.
    ///
    /// # Errors
    ///
    /// `NameNotFound` if no resolver is set.
    #[instrument(skip(self))]
    pub async fn resolver_address(&self, name: &str) -> Result<Address> {
        let node = self.query_node(name)?;
        self.registered_resolver(node, name).await
    }

    /// Resolver handle for `name`.
    #[instrument(skip(self))]
    pub async fn resolver(&self, name: &str) -> Result<Resolver> {
        let node = self.query_node(name)?;
        let address = self.registered_resolver(node, name).await?;
        Ok(self.bind(address, node, name))
    }

    /// Resolver handle for a node given as hex, with or without `0x`.
    #[instrument(skip(self))]
    pub async fn resolver_for_node(&self, node_hex: &str) -> Result<Resolver> {
        let node = Node::parse_hex(node_hex)
            .ok_or_else(|| EnsError::InvalidNode(node_hex.to_string()))?;
        let target = node.to_string();
        let address = self.registered_resolver(node, &target).await?;
        Ok(self.bind(address, node, &target))
    }

    /// Address `name` resolves to.
    ///
    /// A name without a resolver, or whose resolver holds no address, is
    /// handled according to [`EnsConfig::absent_policy`].
    #[instrument(skip(self))]
    pub async fn lookup(&self, name: &str) -> Result<Address> {
        let resolved = match self.resolver(name).await {
            Ok(resolver) => resolver.addr().await,
            Err(err) => Err(err),
        };

        match (resolved, self.config.absent_policy) {
            (Ok(address), AbsentPolicy::Error) if address.is_zero() => Err(self.not_found(name)),
            (Err(err), AbsentPolicy::ZeroAddress) if err.is_not_found() => Ok(Address::ZERO),
            (result, _) => {
                if let Ok(address) = &result {
                    debug!(%address, "Resolved name");
                }
                result
            }
        }
    }

    /// Resolver handle for the reverse record of `address`.
    #[instrument(skip(self))]
    pub async fn reverse_resolver(&self, address: &str) -> Result<Resolver> {
        let address = parse_address(address)?;
        let node = reverse_node(&address);
        let target = ens_namehash::reverse_name(&address);

        let resolver = self.registered_resolver(node, &target).await?;
        Ok(self.bind(resolver, node, &target))
    }

    /// Name recorded on the reverse record of `address`.
    #[instrument(skip(self))]
    pub async fn reverse(&self, address: &str) -> Result<String> {
        let resolver = self.reverse_resolver(address).await?;
        let name = resolver.name().await?;
        if name.is_empty() {
            return Err(self.not_found(resolver.target()));
        }
        Ok(name)
    }

    /// Transfers ownership of `name`.
    #[instrument(skip(self, opts))]
    pub async fn set_owner(&self, name: &str, owner: Address, opts: &TxOptions) -> Result<B256> {
        let node = self.mutation_node(name)?;
        self.registry.set_owner(node, owner, opts).await
    }

    /// Sets the resolver of `name`.
    #[instrument(skip(self, opts))]
    pub async fn set_resolver(
        &self,
        name: &str,
        resolver: Address,
        opts: &TxOptions,
    ) -> Result<B256> {
        let node = self.mutation_node(name)?;
        self.registry.set_resolver(node, resolver, opts).await
    }

    /// Assigns ownership of `name` from its parent.
    ///
    /// `"baz.bar.puffs"` is created under `"bar.puffs"`; the sender must own
    /// the parent.
    #[instrument(skip(self, opts))]
    pub async fn set_subnode_owner(
        &self,
        name: &str,
        owner: Address,
        opts: &TxOptions,
    ) -> Result<B256> {
        let (label, parent) = split_name(name)?;
        let label = label_hash(&label)?;
        self.registry.set_subnode_owner(parent, label, owner, opts).await
    }

    /// Polls for the receipt of `tx_hash` with the configured interval and
    /// attempt bound.
    pub async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        tx::wait_for_receipt(
            self.transport.as_ref(),
            tx_hash,
            Duration::from_millis(self.config.receipt_poll_interval_ms),
            self.config.receipt_max_attempts,
        )
        .await
    }

    /// Node for a read. The empty name is treated as never registered.
    fn query_node(&self, name: &str) -> Result<Node> {
        if name.is_empty() {
            return Err(self.not_found(name));
        }
        namehash(name)
    }

    fn mutation_node(&self, name: &str) -> Result<Node> {
        if name.is_empty() {
            return Err(EnsError::EmptyLabel { name: String::new() });
        }
        namehash(name)
    }

    async fn registered_resolver(&self, node: Node, name: &str) -> Result<Address> {
        let address = self.registry.resolver(node).await?;
        if address.is_zero() {
            debug!(name, "No resolver set");
            return Err(self.not_found(name));
        }
        Ok(address)
    }

    fn bind(&self, address: Address, node: Node, target: &str) -> Resolver {
        Resolver::new(
            self.registry.clone(),
            Arc::clone(&self.transport),
            address,
            node,
            target.to_string(),
            self.config.not_found_message.clone(),
        )
    }

    fn not_found(&self, name: &str) -> EnsError {
        EnsError::not_found(name, self.config.not_found_message.clone())
    }
}

impl std::fmt::Debug for Ens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ens")
            .field("registry", &self.registry.address())
            .field("config", &self.config)
            .finish()
    }
}

fn parse_address(raw: &str) -> Result<Address> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnsError::InvalidAddress("empty address".into()));
    }
    trimmed
        .to_lowercase()
        .parse::<Address>()
        .map_err(|e| EnsError::InvalidAddress(format!("'{raw}': {e}")))
}

/// Builder for [`Ens`].
#[derive(Default)]
pub struct EnsBuilder {
    transport: Option<Arc<dyn ChainTransport>>,
    config: EnsConfig,
}

impl EnsBuilder {
    /// Sets the chain transport.
    pub fn transport<T: ChainTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets a shared chain transport.
    pub fn transport_arc(mut self, transport: Arc<dyn ChainTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Selects the registry by network id.
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.config.network = Some(network.into());
        self
    }

    /// Uses an explicit registry address.
    pub fn registry(mut self, registry: Address) -> Self {
        self.config.registry_address = Some(registry);
        self
    }

    /// Replaces the network table.
    pub fn networks(mut self, networks: NetworkTable) -> Self {
        self.config.networks = networks;
        self
    }

    /// Sets the "name not defined" message.
    pub fn not_found_message(mut self, message: impl Into<String>) -> Self {
        self.config.not_found_message = message.into();
        self
    }

    /// Sets the lookup absent policy.
    pub fn absent_policy(mut self, policy: AbsentPolicy) -> Self {
        self.config.absent_policy = policy;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: EnsConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// [`EnsError::Config`] if the transport or the registry is missing.
    pub fn build(self) -> Result<Ens> {
        let transport = self
            .transport
            .ok_or_else(|| EnsError::Config("a chain transport is required".into()))?;
        Ens::new(transport, self.config)
    }
}
