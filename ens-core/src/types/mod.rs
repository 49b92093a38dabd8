//! Domain types for ENS name resolution.

mod node;
mod record;
mod tx;

pub use node::Node;
pub use record::{Capabilities, ContractAbi, RecordType};
pub use tx::{TransactionReceipt, TransactionRequest, TxOptions};
