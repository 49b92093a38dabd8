//! Resolver record types and capability descriptors.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{EnsError, Result};

/// Record types a resolver may expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Forward address record.
    Addr,
    /// Reverse name record.
    Name,
    /// Contract ABI record.
    Abi,
    /// SECP256k1 public key record.
    Pubkey,
    /// Text records.
    Text,
    /// Content hash record.
    Contenthash,
}

impl RecordType {
    /// Every record type, in probing order.
    pub const ALL: [RecordType; 6] = [
        RecordType::Addr,
        RecordType::Name,
        RecordType::Abi,
        RecordType::Pubkey,
        RecordType::Text,
        RecordType::Contenthash,
    ];

    /// EIP-165 interface id of the record's getter.
    pub fn interface_id(&self) -> [u8; 4] {
        match self {
            RecordType::Addr => ADDR_INTERFACE_ID,
            RecordType::Name => NAME_INTERFACE_ID,
            RecordType::Abi => ABI_INTERFACE_ID,
            RecordType::Pubkey => PUBKEY_INTERFACE_ID,
            RecordType::Text => TEXT_INTERFACE_ID,
            RecordType::Contenthash => CONTENTHASH_INTERFACE_ID,
        }
    }

    /// Tag passed to the legacy `has(bytes32,bytes32)` probe.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordType::Addr => "addr",
            RecordType::Name => "name",
            RecordType::Abi => "abi",
            RecordType::Pubkey => "pubkey",
            RecordType::Text => "text",
            RecordType::Contenthash => "contenthash",
        }
    }

    /// Looks up a record type by interface id.
    pub fn from_interface_id(id: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.interface_id() == id)
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

impl FromStr for RecordType {
    type Err = EnsError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        RecordType::ALL
            .into_iter()
            .find(|r| r.kind() == lower)
            .ok_or_else(|| EnsError::Decode(format!("unknown record type: {s}")))
    }
}

/// Set of record types a resolver reports supporting.
///
/// Produced once per resolver by introspection and checked before dispatching
/// a record query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No capabilities.
    pub const fn empty() -> Self {
        Capabilities(0)
    }

    /// Every known record type.
    pub fn all() -> Self {
        RecordType::ALL.into_iter().collect()
    }

    /// Adds a record type.
    pub fn insert(&mut self, record: RecordType) {
        self.0 |= record.bit();
    }

    /// Builder-style insert.
    pub fn with(mut self, record: RecordType) -> Self {
        self.insert(record);
        self
    }

    /// Returns true if the record type is supported.
    pub fn contains(&self, record: RecordType) -> bool {
        self.0 & record.bit() != 0
    }

    /// Returns true if nothing is supported.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of supported record types.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Supported record types in probing order.
    pub fn iter(&self) -> impl Iterator<Item = RecordType> + '_ {
        RecordType::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl FromIterator<RecordType> for Capabilities {
    fn from_iter<I: IntoIterator<Item = RecordType>>(iter: I) -> Self {
        let mut caps = Capabilities::empty();
        for record in iter {
            caps.insert(record);
        }
        caps
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&str> = self.iter().map(|r| r.kind()).collect();
        write!(f, "[{}]", kinds.join(", "))
    }
}

/// ABI record returned by a resolver's `ABI(bytes32,uint256)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAbi {
    /// EIP-205 content type of `data`. Zero means no record.
    pub content_type: u64,
    /// Encoded ABI.
    pub data: Bytes,
}

impl ContractAbi {
    /// Returns true if the resolver returned no record.
    pub fn is_empty(&self) -> bool {
        self.content_type == 0
    }

    /// Parses a JSON content-type ABI into a JSON value.
    pub fn json(&self) -> Result<serde_json::Value> {
        if self.content_type != ABI_CONTENT_JSON {
            return Err(EnsError::Decode(format!(
                "ABI content type {} is not JSON",
                self.content_type
            )));
        }
        Ok(serde_json::from_slice(&self.data)?)
    }
}
