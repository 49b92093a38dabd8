//! Protocol constants for ENS name resolution.
//!
//! Interface ids follow EIP-137 / EIP-165 / EIP-181 / EIP-205. Registry
//! addresses are the well-known deployments the default network table ships with.

// ═══════════════════════════════════════════════════════════════════════════════
// SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a namehash node in bytes.
pub const NODE_SIZE: usize = 32;

/// Length of a node rendered as hex without prefix.
pub const NODE_HEX_LEN: usize = NODE_SIZE * 2;

/// Size of an Ethereum address in bytes.
pub const ADDRESS_SIZE: usize = 20;

// ═══════════════════════════════════════════════════════════════════════════════
// NAMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Suffix under which reverse records live.
pub const REVERSE_SUFFIX: &str = "addr.reverse";

/// Message carried by "name not found" errors unless configured otherwise.
pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "ENS name not defined.";

/// Message used by the PUFFScoin deployment for missing names.
pub const PUFFS_NOT_FOUND_MESSAGE: &str = "PUFFScoin-ENS name not defined.";

// ═══════════════════════════════════════════════════════════════════════════════
// WELL-KNOWN REGISTRIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Network id of Ethereum mainnet.
pub const NETWORK_MAINNET: &str = "1";

/// Network id of the Ropsten testnet.
pub const NETWORK_ROPSTEN: &str = "3";

/// Registry contract on mainnet.
pub const MAINNET_REGISTRY_ADDRESS: &str = "0x314159265dd8dbb310642f98f50c066173c1259b";

/// Registry contract on Ropsten.
pub const ROPSTEN_REGISTRY_ADDRESS: &str = "0x112234455c3a32fd11230c42e7bccd4a84e02010";

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVER INTERFACE IDS (EIP-165)
// ═══════════════════════════════════════════════════════════════════════════════

/// `supportsInterface(bytes4)` itself.
pub const INTERFACE_META_ID: [u8; 4] = [0x01, 0xff, 0xc9, 0xa7];

/// `addr(bytes32)`.
pub const ADDR_INTERFACE_ID: [u8; 4] = [0x3b, 0x3b, 0x57, 0xde];

/// `name(bytes32)`.
pub const NAME_INTERFACE_ID: [u8; 4] = [0x69, 0x1f, 0x34, 0x31];

/// `ABI(bytes32,uint256)`.
pub const ABI_INTERFACE_ID: [u8; 4] = [0x22, 0x03, 0xab, 0x56];

/// `pubkey(bytes32)`.
pub const PUBKEY_INTERFACE_ID: [u8; 4] = [0xc8, 0x69, 0x02, 0x33];

/// `text(bytes32,string)`.
pub const TEXT_INTERFACE_ID: [u8; 4] = [0x59, 0xd1, 0xd4, 0x3c];

/// `contenthash(bytes32)`.
pub const CONTENTHASH_INTERFACE_ID: [u8; 4] = [0xbc, 0x1c, 0x58, 0xd1];

// ═══════════════════════════════════════════════════════════════════════════════
// ABI CONTENT TYPES (EIP-205)
// ═══════════════════════════════════════════════════════════════════════════════

/// Uncompressed JSON ABI.
pub const ABI_CONTENT_JSON: u64 = 1;

/// zlib-compressed JSON ABI.
pub const ABI_CONTENT_ZLIB_JSON: u64 = 2;

/// CBOR encoded ABI.
pub const ABI_CONTENT_CBOR: u64 = 4;

/// ABI stored at a URI.
pub const ABI_CONTENT_URI: u64 = 8;

// ═══════════════════════════════════════════════════════════════════════════════
// RECEIPT POLLING
// ═══════════════════════════════════════════════════════════════════════════════

/// Delay between receipt polls.
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1_000;

/// Receipt polls before giving up.
pub const DEFAULT_RECEIPT_MAX_ATTEMPTS: u32 = 120;
