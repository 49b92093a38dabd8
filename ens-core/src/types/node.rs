//! Namehash node identifiers.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};

use crate::constants::NODE_HEX_LEN;
use crate::error::{EnsError, Result};

/// A 32-byte namehash identifying a name in the registry.
///
/// Rendered as `0x`-prefixed lowercase hex. Parsing accepts the hex with or
/// without the prefix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(B256);

impl Node {
    /// The root node (namehash of the empty name).
    pub const ROOT: Node = Node(B256::ZERO);

    /// Wraps raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Node(B256::new(bytes))
    }

    /// Returns the underlying hash.
    pub fn as_b256(&self) -> B256 {
        self.0
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    /// Returns true for the root node.
    pub fn is_root(&self) -> bool {
        self.0 == B256::ZERO
    }

    /// Parses a 64-digit hex node, with or without `0x`.
    ///
    /// Returns `None` if the input is not exactly a 32-byte hex identifier.
    pub fn parse_hex(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != NODE_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).ok()?;
        Some(Node::from_bytes(bytes))
    }

    /// Hex without the `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl FromStr for Node {
    type Err = EnsError;

    fn from_str(s: &str) -> Result<Self> {
        Node::parse_hex(s).ok_or_else(|| EnsError::Decode(format!("not a 32-byte node: {s}")))
    }
}

impl From<B256> for Node {
    fn from(hash: B256) -> Self {
        Node(hash)
    }
}

impl From<Node> for B256 {
    fn from(node: Node) -> Self {
        node.0
    }
}
