//! # ENS Namehash
//!
//! Name normalization and namehash computation.
//!
//! This crate provides:
//!
//! - **Normalize**: case folding and character validation of dotted names
//! - **Namehash**: the recursive Keccak-256 node identifier of a name
//! - **Reverse**: node of the `addr.reverse` record for an address
//!
//! Everything here is pure: no I/O and no shared state.
//!
//! ## Example
//!
//! ```rust
//! use ens_namehash::{namehash, normalize};
//!
//! assert_eq!(normalize("Foo.ETH").unwrap(), "foo.eth");
//! assert_eq!(
//!     namehash("foo.eth").unwrap().to_string(),
//!     "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
//! );
//! assert!(normalize("foo_bar.eth").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod hash;
pub mod normalize;

// Re-export main functions at crate root
pub use hash::{
    keccak256, label_hash, namehash, parse_node, reverse_name, reverse_node, split_name,
};
pub use normalize::{is_valid_name, normalize};
