//! # ENS Client
//!
//! Registry and resolver client for ENS-style name services (ENS, PUFFScoin-ENS).
//!
//! ## Features
//!
//! - **Resolution**: name → address, address → name, ABI records
//! - **Introspection**: EIP-165 capability probing and the legacy `has` check
//! - **Registry writes**: owner, resolver and subnode owner, with receipt polling
//! - **Transports**: JSON-RPC over HTTP, or an in-memory chain for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use ens_client::{Ens, HttpTransport};
//!
//! let ens = Ens::builder()
//!     .transport(HttpTransport::new("https://ethereum.publicnode.com")?)
//!     .network("1")
//!     .build()?;
//!
//! let address = ens.lookup("vitalik.eth").await?;
//! let name = ens.reverse(&address.to_string()).await?;
//! ```
//!
//! Every call goes to the chain; nothing is cached.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod abi;
pub mod client;
pub mod config;
pub mod memory;
pub mod registry;
pub mod resolver;
pub mod transport;
pub mod tx;

pub use client::{Ens, EnsBuilder};
pub use config::{AbsentPolicy, EnsConfig, NetworkTable};
pub use memory::{MemoryChain, ResolverProfile};
pub use registry::Registry;
pub use resolver::Resolver;
pub use transport::{HttpConfig, HttpTransport, DEFAULT_ETH_RPC_URL};
pub use tx::wait_for_receipt;
