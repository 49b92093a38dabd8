//! Error types for the ENS client.
//!
//! Every failure carries an [`ErrorKind`] so callers can branch on the class of
//! failure (malformed name, missing record, infrastructure) without matching on
//! message text. Messages stay human-readable and, for missing names, match the
//! configured "name not defined" text exactly.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `EnsError`.
pub type Result<T> = std::result::Result<T, EnsError>;

/// Coarse classification of an [`EnsError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Client was built without a transport or registry.
    Configuration,
    /// Name (or address) failed validation. No network call was made.
    InvalidName,
    /// No resolver registered, or the resolver lacks the record.
    NameNotFound,
    /// A contract call reverted and the cause could not be attributed to a
    /// missing record.
    Ambiguous,
    /// RPC, HTTP, or decoding failure.
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::InvalidName => "invalid_name",
            ErrorKind::NameNotFound => "name_not_found",
            ErrorKind::Ambiguous => "ambiguous",
            ErrorKind::Transport => "transport",
        };
        f.write_str(s)
    }
}

/// Main error type for all ENS client operations.
#[derive(Debug, Error)]
pub enum EnsError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Missing transport, missing network/registry, or unknown network.
    #[error("Configuration error: {0}")]
    Config(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // NAME ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Name contains a character the normalization policy rejects.
    #[error("Illegal char {character} in name '{name}'")]
    InvalidName {
        /// The name as supplied.
        name: String,
        /// First offending character.
        character: char,
    },

    /// Name contains an empty label (`foo..bar`, leading or trailing dot).
    #[error("Empty label in name '{name}'")]
    EmptyLabel {
        /// The name as supplied.
        name: String,
    },

    /// Address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Node is not 64 hex digits (with or without `0x`).
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Legacy record kind does not fit in a `bytes32`.
    #[error("Invalid record kind '{0}': longer than 32 bytes")]
    InvalidRecordKind(String),

    /// Name has no resolver, no owner, or its resolver lacks the record.
    ///
    /// Displays exactly `message` so callers relying on the configured text
    /// keep working.
    #[error("{message}")]
    NameNotFound {
        /// Name or node that was looked up.
        name: String,
        /// Configured "name not defined" text.
        message: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CHAIN ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Contract execution reverted. The raw message is kept unmodified.
    #[error("{message}")]
    Reverted {
        /// Message reported by the node.
        message: String,
    },

    /// JSON-RPC error response other than a revert.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// HTTP or connection failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Receipt polling gave up.
    #[error("Transaction {tx_hash} not mined after {attempts} attempts")]
    Timeout {
        /// Hash of the pending transaction.
        tx_hash: String,
        /// Number of polls made.
        attempts: u32,
    },
}

impl EnsError {
    /// Builds a `NameNotFound` error.
    pub fn not_found(name: impl Into<String>, message: impl Into<String>) -> Self {
        EnsError::NameNotFound {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Builds an error from a JSON-RPC error object.
    ///
    /// Revert-like failures become [`EnsError::Reverted`] with the message
    /// untouched; everything else becomes [`EnsError::Rpc`].
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == 3 || is_revert_message(&message) {
            EnsError::Reverted { message }
        } else {
            EnsError::Rpc { code, message }
        }
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnsError::Config(_) => ErrorKind::Configuration,
            EnsError::InvalidName { .. }
            | EnsError::EmptyLabel { .. }
            | EnsError::InvalidAddress(_)
            | EnsError::InvalidNode(_)
            | EnsError::InvalidRecordKind(_) => ErrorKind::InvalidName,
            EnsError::NameNotFound { .. } => ErrorKind::NameNotFound,
            EnsError::Reverted { .. } => ErrorKind::Ambiguous,
            EnsError::Rpc { .. }
            | EnsError::Transport(_)
            | EnsError::Decode(_)
            | EnsError::Json(_)
            | EnsError::Hex(_)
            | EnsError::Timeout { .. } => ErrorKind::Transport,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            EnsError::Config(_) => "CONFIGURATION",
            EnsError::InvalidName { .. } | EnsError::EmptyLabel { .. } => "INVALID_NAME",
            EnsError::InvalidAddress(_) => "INVALID_ADDRESS",
            EnsError::InvalidNode(_) => "INVALID_NODE",
            EnsError::InvalidRecordKind(_) => "INVALID_RECORD_KIND",
            EnsError::NameNotFound { .. } => "NAME_NOT_FOUND",
            EnsError::Reverted { .. } => "EXECUTION_REVERTED",
            EnsError::Timeout { .. } => "TIMEOUT",
            _ => "TRANSPORT",
        }
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EnsError::Transport(_) | EnsError::Rpc { .. } | EnsError::Timeout { .. }
        )
    }

    /// Returns true for `NameNotFound`.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NameNotFound
    }

    /// Returns true for local input validation failures (name, address,
    /// node or record kind).
    pub fn is_invalid_name(&self) -> bool {
        self.kind() == ErrorKind::InvalidName
    }
}

/// Returns true if a node error message describes a contract revert.
///
/// Older clients report missing resolver functions as `invalid JUMP` or
/// `invalid opcode` rather than `execution reverted`.
pub fn is_revert_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("revert") || lower.contains("invalid jump") || lower.contains("invalid opcode")
}
