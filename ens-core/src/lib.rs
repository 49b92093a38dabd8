//! # ENS Core
//!
//! Core types, errors, and traits shared by the ENS name client crates.
//!
//! This crate provides the foundational building blocks used by the other crates:
//!
//! - **Types**: Nodes (namehashes), record types, transaction options and receipts
//! - **Errors**: A classified error taxonomy callers can branch on
//! - **Constants**: Interface ids, well-known registries, reverse suffix
//! - **Traits**: The narrow chain transport interface the client calls through
//!
//! ## Example
//!
//! ```rust
//! use ens_core::{EnsError, ErrorKind, Node};
//!
//! let root = Node::ROOT;
//! assert!(root.is_root());
//!
//! let err = EnsError::not_found("nobody.eth", "ENS name not defined.");
//! assert_eq!(err.kind(), ErrorKind::NameNotFound);
//! assert_eq!(err.to_string(), "ENS name not defined.");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{EnsError, ErrorKind, Result};
pub use traits::*;
pub use types::*;

/// Ethereum primitives used throughout the public API.
pub use alloy::primitives::{Address, Bytes, B256, U256};
