//! Transaction options, requests, and receipts.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Caller-supplied options for state-changing calls.
///
/// Unset fields are left for the node to fill in. When `from` is unset the
/// client sends from the transport's first account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOptions {
    /// Sending account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Gas limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    /// Gas price in wei
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    /// Value in wei
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

impl TxOptions {
    /// Options sending from `from`.
    pub fn sender(from: Address) -> Self {
        Self {
            from: Some(from),
            ..Default::default()
        }
    }

    /// Sets the gas limit.
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Sets the gas price.
    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }
}

/// A fully-resolved transaction ready for `eth_sendTransaction`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Sending account
    pub from: Address,
    /// Contract being called
    pub to: Address,
    /// ABI-encoded call
    pub data: Bytes,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price in wei
    pub gas_price: Option<u128>,
    /// Value in wei
    pub value: Option<U256>,
}

impl TransactionRequest {
    /// Builds a request from call data and caller options.
    pub fn new(from: Address, to: Address, data: Bytes, options: &TxOptions) -> Self {
        Self {
            from,
            to,
            data,
            gas: options.gas,
            gas_price: options.gas_price,
            value: options.value,
        }
    }
}

/// Subset of a transaction receipt the client reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash
    pub transaction_hash: B256,
    /// Block the transaction was mined in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Execution status (post-Byzantium)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    /// Created contract, for deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    /// Gas consumed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
}

impl TransactionReceipt {
    /// Returns true unless the receipt reports a failed execution.
    pub fn succeeded(&self) -> bool {
        self.status.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_options_builder() {
        let from = Address::repeat_byte(0x11);
        let opts = TxOptions::sender(from).with_gas(100_000).with_gas_price(7);

        assert_eq!(opts.from, Some(from));
        assert_eq!(opts.gas, Some(100_000));
        assert_eq!(opts.gas_price, Some(7));
        assert!(opts.value.is_none());
    }

    #[test]
    fn test_request_copies_options() {
        let opts = TxOptions::default().with_gas(21_000);
        let req = TransactionRequest::new(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            Bytes::from(vec![0xde, 0xad]),
            &opts,
        );
        assert_eq!(req.gas, Some(21_000));
        assert_eq!(req.to, Address::repeat_byte(2));
    }

    #[test]
    fn test_receipt_status() {
        let mut receipt = TransactionReceipt {
            transaction_hash: B256::ZERO,
            block_number: Some(1),
            status: None,
            contract_address: None,
            gas_used: None,
        };
        assert!(receipt.succeeded());
        receipt.status = Some(false);
        assert!(!receipt.succeeded());
    }
}
