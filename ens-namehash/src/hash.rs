//! Namehash computation.
//!
//! ```text
//! namehash("")           = 0x00..00
//! namehash(label.rest)   = keccak256(namehash(rest) || keccak256(label))
//! ```
//!
//! Labels are consumed right to left, starting from the top-level label.

use sha3::{Digest, Keccak256};

use ens_core::constants::REVERSE_SUFFIX;
use ens_core::error::{EnsError, Result};
use ens_core::{Address, Node, B256};

use crate::normalize::normalize;

/// Computes Keccak-256.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    Digest::update(&mut hasher, input);
    hasher.finalize().into()
}

/// Folds already-normalized labels into a node.
fn namehash_normalized(name: &str) -> Node {
    let mut node = [0u8; 32];

    if name.is_empty() {
        return Node::from_bytes(node);
    }

    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());

        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(&node);
        combined[32..].copy_from_slice(&label_hash);

        node = keccak256(&combined);
    }

    Node::from_bytes(node)
}

/// Detects input that already is a node: 64 hex digits, `0x` optional.
pub fn parse_node(input: &str) -> Option<Node> {
    Node::parse_hex(input)
}

/// Computes the namehash of `name`.
///
/// The name is normalized first. Input that already is a 32-byte hex node,
/// with or without `0x`, is returned unchanged so callers can pass either a
/// name or a precomputed node.
///
/// # Errors
///
/// [`EnsError::InvalidName`] / [`EnsError::EmptyLabel`] if the name does not
/// normalize.
pub fn namehash(name: &str) -> Result<Node> {
    if let Some(node) = parse_node(name) {
        return Ok(node);
    }

    let normalized = normalize(name)?;
    Ok(namehash_normalized(&normalized))
}

/// Hash of a single normalized label, as used by `setSubnodeOwner`.
pub fn label_hash(label: &str) -> Result<B256> {
    if label.contains('.') {
        return Err(EnsError::InvalidName {
            name: label.into(),
            character: '.',
        });
    }
    if label.is_empty() {
        return Err(EnsError::EmptyLabel { name: label.into() });
    }

    let normalized = normalize(label)?;
    Ok(B256::from(keccak256(normalized.as_bytes())))
}

/// Splits a name into its first label and the node of its parent.
///
/// `"BAZ.bar.puffs"` yields `("baz", namehash("bar.puffs"))`; a single label
/// has the root as parent.
pub fn split_name(name: &str) -> Result<(String, Node)> {
    let normalized = normalize(name)?;
    if normalized.is_empty() {
        return Err(EnsError::EmptyLabel { name: name.into() });
    }

    match normalized.split_once('.') {
        Some((label, parent)) => Ok((label.to_string(), namehash_normalized(parent))),
        None => Ok((normalized, Node::ROOT)),
    }
}

/// Reverse-record name of an address: lowercase hex without `0x` under
/// `addr.reverse`.
pub fn reverse_name(address: &Address) -> String {
    format!("{}.{}", hex::encode(address.as_slice()), REVERSE_SUFFIX)
}

/// Node of the reverse record of an address.
pub fn reverse_node(address: &Address) -> Node {
    namehash_normalized(&reverse_name(address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("" => "0x0000000000000000000000000000000000000000000000000000000000000000" ; "root")]
    #[test_case("eth" => "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae" ; "eth")]
    #[test_case("foo.eth" => "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f" ; "foo eth")]
    #[test_case("puffs" => "0xca8c1ae34d751f0f90ce84e46231d0a7a59d5126efbc18a34621aac0b118f888" ; "puffs")]
    #[test_case("foo.puffs" => "0x9140eb58df1e4b69b42036ba27769148ddb31ac2f685c46ff1b02938b6f104b3" ; "foo puffs")]
    #[test_case("addr.reverse" => "0x91d1777781884d03a6757a803996e38de2a42967fb37eeaca72729271025a9e2" ; "reverse root")]
    fn test_namehash_known_vectors(name: &str) -> String {
        namehash(name).unwrap().to_string()
    }

    #[test]
    fn test_keccak256_empty() {
        let expected = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";
        assert_eq!(hex::encode(keccak256(b"")), expected);
    }

    #[test]
    fn test_namehash_canonicalizes_case() {
        assert_eq!(namehash("name.puffs").unwrap(), namehash("NAME.puffs").unwrap());
    }

    #[test]
    fn test_namehash_canonicalizes_compatibility_forms() {
        assert_eq!(namehash("ＦＯＯ.eth").unwrap(), namehash("foo.eth").unwrap());
        assert_eq!(
            namehash("cafe\u{301}.eth").unwrap(),
            namehash("caf\u{e9}.eth").unwrap()
        );
    }

    #[test]
    fn test_namehash_rejects_bad_name() {
        let err = namehash("dino dan.puffs").unwrap_err();
        assert!(err.is_invalid_name());
    }

    #[test]
    fn test_namehash_passes_through_nodes() {
        let node = namehash("foo.puffs").unwrap();
        assert_eq!(namehash(&node.to_string()).unwrap(), node);
        assert_eq!(namehash(&node.to_hex()).unwrap(), node);
    }

    #[test]
    fn test_parse_node() {
        assert!(parse_node("foo.puffs").is_none());
        assert!(parse_node(&"ab".repeat(31)).is_none());
        assert_eq!(parse_node(&"00".repeat(32)), Some(Node::ROOT));
    }

    #[test]
    fn test_label_hash() {
        assert_eq!(label_hash("BAZ").unwrap(), B256::from(keccak256(b"baz")));
        assert!(label_hash("a.b").is_err());
        assert!(label_hash("").is_err());
        assert!(label_hash("a_b").is_err());
    }

    #[test]
    fn test_split_name() {
        let (label, parent) = split_name("BAZ.bar.puffs").unwrap();
        assert_eq!(label, "baz");
        assert_eq!(parent, namehash("bar.puffs").unwrap());

        let (label, parent) = split_name("puffs").unwrap();
        assert_eq!(label, "puffs");
        assert!(parent.is_root());

        assert!(split_name("").is_err());
    }

    #[test]
    fn test_split_name_recombines() {
        let (label, parent) = split_name("baz.bar.puffs").unwrap();
        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(parent.as_bytes());
        combined[32..].copy_from_slice(&keccak256(label.as_bytes()));
        assert_eq!(Node::from_bytes(keccak256(&combined)), namehash("baz.bar.puffs").unwrap());
    }

    #[test]
    fn test_reverse_name_strips_prefix() {
        let address: Address = "0xd1220a0cf47c7b9be7a2e6ba89f429762e7b9adb".parse().unwrap();
        assert_eq!(
            reverse_name(&address),
            "d1220a0cf47c7b9be7a2e6ba89f429762e7b9adb.addr.reverse"
        );
        assert_eq!(reverse_node(&address), namehash(&reverse_name(&address)).unwrap());
    }

    proptest! {
        #[test]
        fn prop_distinct_labels_distinct_hashes(a in "[a-z]{1,10}", b in "[a-z]{1,10}") {
            prop_assume!(a != b);
            prop_assert_ne!(namehash(&a).unwrap(), namehash(&b).unwrap());
        }

        #[test]
        fn prop_namehash_deterministic(name in "[a-z0-9]{1,10}(\\.[a-z0-9]{1,10}){0,2}") {
            prop_assert_eq!(namehash(&name).unwrap(), namehash(&name).unwrap());
        }
    }
}
