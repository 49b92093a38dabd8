//! Client configuration.
//!
//! The network → registry table is plain configuration data handed to the
//! client, never process-global state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ens_core::constants::{
    DEFAULT_NOT_FOUND_MESSAGE, DEFAULT_RECEIPT_MAX_ATTEMPTS, DEFAULT_RECEIPT_POLL_INTERVAL_MS,
    MAINNET_REGISTRY_ADDRESS, NETWORK_MAINNET, NETWORK_ROPSTEN, ROPSTEN_REGISTRY_ADDRESS,
};
use ens_core::error::{EnsError, Result};
use ens_core::Address;

/// Mapping from network id (e.g. `"1"`, `"3"`) to registry address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkTable(BTreeMap<String, Address>);

impl NetworkTable {
    /// A table with no entries.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces a network entry.
    pub fn insert(&mut self, network: impl Into<String>, registry: Address) {
        self.0.insert(network.into(), registry);
    }

    /// Builder-style insert.
    pub fn with(mut self, network: impl Into<String>, registry: Address) -> Self {
        self.insert(network, registry);
        self
    }

    /// Registry address for a network id.
    pub fn get(&self, network: &str) -> Option<Address> {
        self.0.get(network.trim()).copied()
    }

    /// Known network ids.
    pub fn networks(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for NetworkTable {
    /// Well-known deployments (mainnet and Ropsten).
    fn default() -> Self {
        let known = [
            (NETWORK_MAINNET, MAINNET_REGISTRY_ADDRESS),
            (NETWORK_ROPSTEN, ROPSTEN_REGISTRY_ADDRESS),
        ];

        Self(
            known
                .into_iter()
                .filter_map(|(id, raw)| raw.parse::<Address>().ok().map(|addr| (id.to_string(), addr)))
                .collect(),
        )
    }
}

/// What `lookup` returns for a name without an address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentPolicy {
    /// Fail with `NameNotFound`.
    #[default]
    Error,
    /// Resolve to the zero address.
    ZeroAddress,
}

/// ENS client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnsConfig {
    /// Network id used to pick a registry from `networks`
    pub network: Option<String>,
    /// Explicit registry address; takes precedence over `network`
    pub registry_address: Option<Address>,
    /// Network id → registry address table
    pub networks: NetworkTable,
    /// Text carried by `NameNotFound` errors
    pub not_found_message: String,
    /// Behaviour of `lookup` for names without an address
    pub absent_policy: AbsentPolicy,
    /// Delay between receipt polls in milliseconds
    pub receipt_poll_interval_ms: u64,
    /// Receipt polls before giving up
    pub receipt_max_attempts: u32,
}

impl Default for EnsConfig {
    fn default() -> Self {
        Self {
            network: None,
            registry_address: None,
            networks: NetworkTable::default(),
            not_found_message: DEFAULT_NOT_FOUND_MESSAGE.into(),
            absent_policy: AbsentPolicy::default(),
            receipt_poll_interval_ms: DEFAULT_RECEIPT_POLL_INTERVAL_MS,
            receipt_max_attempts: DEFAULT_RECEIPT_MAX_ATTEMPTS,
        }
    }
}

impl EnsConfig {
    /// Creates a configuration for a network id in the default table.
    pub fn for_network(network: impl Into<String>) -> Self {
        Self {
            network: Some(network.into()),
            ..Default::default()
        }
    }

    /// Creates a configuration for an explicit registry address.
    pub fn for_registry(registry: Address) -> Self {
        Self {
            registry_address: Some(registry),
            ..Default::default()
        }
    }

    /// Replaces the network table.
    pub fn with_networks(mut self, networks: NetworkTable) -> Self {
        self.networks = networks;
        self
    }

    /// Sets the "name not defined" message.
    pub fn with_not_found_message(mut self, message: impl Into<String>) -> Self {
        self.not_found_message = message.into();
        self
    }

    /// Sets the lookup absent policy.
    pub fn with_absent_policy(mut self, policy: AbsentPolicy) -> Self {
        self.absent_policy = policy;
        self
    }

    /// Sets receipt polling parameters.
    pub fn with_receipt_polling(mut self, interval_ms: u64, max_attempts: u32) -> Self {
        self.receipt_poll_interval_ms = interval_ms;
        self.receipt_max_attempts = max_attempts;
        self
    }

    /// Resolves the registry address.
    ///
    /// # Errors
    ///
    /// [`EnsError::Config`] if neither a registry address nor a network id is
    /// set, or the network id is not in the table.
    pub fn registry(&self) -> Result<Address> {
        if let Some(address) = self.registry_address {
            return Ok(address);
        }

        let network = self.network.as_deref().ok_or_else(|| {
            EnsError::Config("either a network id or a registry address is required".into())
        })?;

        self.networks
            .get(network)
            .ok_or_else(|| EnsError::Config(format!("no registry known for network '{network}'")))
    }
}
