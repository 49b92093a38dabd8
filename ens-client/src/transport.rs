//! JSON-RPC transport over HTTP.
//!
//! Speaks plain JSON-RPC 2.0 (`eth_call`, `eth_sendTransaction`,
//! `eth_getTransactionReceipt`, `eth_accounts`) to a node. Error objects are
//! classified once here: reverts become [`EnsError::Reverted`], everything else
//! [`EnsError::Rpc`].

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use ens_core::error::{EnsError, Result};
use ens_core::traits::ChainTransport;
use ens_core::types::{TransactionReceipt, TransactionRequest};
use ens_core::{Address, Bytes, B256};

/// Default Ethereum RPC URL when none is provided.
pub const DEFAULT_ETH_RPC_URL: &str = "https://ethereum.publicnode.com";

/// HTTP transport configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Ethereum RPC URL
    pub rpc_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_ETH_RPC_URL.into(),
            timeout_seconds: 30,
        }
    }
}

impl HttpConfig {
    /// Creates a new configuration with the given RPC URL.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// [`ChainTransport`] backed by a JSON-RPC HTTP endpoint.
pub struct HttpTransport {
    config: HttpConfig,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Creates a transport for the given RPC URL.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpConfig::new(rpc_url))
    }

    /// Creates a transport with custom configuration.
    ///
    /// # Errors
    ///
    /// [`EnsError::Config`] if the URL does not parse or the HTTP client
    /// cannot be built.
    pub fn with_config(config: HttpConfig) -> Result<Self> {
        url::Url::parse(&config.rpc_url)
            .map_err(|e| EnsError::Config(format!("invalid RPC URL '{}': {e}", config.rpc_url)))?;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EnsError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the configured RPC URL.
    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    /// Makes a JSON-RPC call and returns the `result` member.
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });

        let response = self
            .http_client
            .post(&self.config.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EnsError::Transport(e.to_string()))?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| EnsError::Transport(e.to_string()))?;

        if let Some(error) = json.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32603);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown RPC error");
            warn!(method, code, error = %message, "RPC error");
            return Err(EnsError::from_rpc(code, message));
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| EnsError::Decode(format!("{method}: response has no result")))
    }
}

#[async_trait]
impl ChainTransport for HttpTransport {
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let result = self
            .rpc_call(
                "eth_call",
                json!([{ "to": hex_address(&to), "data": hex_data(&data) }, "latest"]),
            )
            .await?;

        let raw = result
            .as_str()
            .ok_or_else(|| EnsError::Decode("eth_call: result is not a string".into()))?;
        let bytes = decode_hex_data(raw)?;
        debug!(len = bytes.len(), "eth_call returned");
        Ok(bytes)
    }

    #[instrument(skip(self, tx), fields(from = %tx.from, to = %tx.to))]
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256> {
        let mut object = json!({
            "from": hex_address(&tx.from),
            "to": hex_address(&tx.to),
            "data": hex_data(&tx.data),
        });
        if let Some(gas) = tx.gas {
            object["gas"] = json!(format!("0x{gas:x}"));
        }
        if let Some(gas_price) = tx.gas_price {
            object["gasPrice"] = json!(format!("0x{gas_price:x}"));
        }
        if let Some(value) = tx.value {
            object["value"] = json!(format!("0x{value:x}"));
        }

        let result = self.rpc_call("eth_sendTransaction", json!([object])).await?;
        parse_b256(&result, "eth_sendTransaction")
    }

    #[instrument(skip(self))]
    async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        let result = self
            .rpc_call("eth_getTransactionReceipt", json!([tx_hash.to_string()]))
            .await?;

        if result.is_null() {
            return Ok(None);
        }
        parse_receipt(&result).map(Some)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        let result = self.rpc_call("eth_accounts", json!([])).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| EnsError::Decode("eth_accounts: result is not an array".into()))?;

        entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .and_then(|s| s.parse::<Address>().ok())
                    .ok_or_else(|| EnsError::Decode(format!("eth_accounts: bad address {entry}")))
            })
            .collect()
    }
}

fn hex_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

fn hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decodes `0x`-prefixed hex data. `"0x"` is empty data.
fn decode_hex_data(raw: &str) -> Result<Bytes> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    Ok(Bytes::from(hex::decode(digits)?))
}

fn parse_b256(value: &Value, method: &str) -> Result<B256> {
    value
        .as_str()
        .and_then(|s| s.parse::<B256>().ok())
        .ok_or_else(|| EnsError::Decode(format!("{method}: expected 32-byte hash, got {value}")))
}

fn parse_quantity(value: Option<&Value>) -> Option<u64> {
    let raw = value?.as_str()?;
    u64::from_str_radix(raw.strip_prefix("0x").unwrap_or(raw), 16).ok()
}

fn parse_receipt(value: &Value) -> Result<TransactionReceipt> {
    let transaction_hash = value
        .get("transactionHash")
        .ok_or_else(|| EnsError::Decode("receipt has no transactionHash".into()))
        .and_then(|v| parse_b256(v, "eth_getTransactionReceipt"))?;

    let contract_address = value
        .get("contractAddress")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Address>().ok());

    Ok(TransactionReceipt {
        transaction_hash,
        block_number: parse_quantity(value.get("blockNumber")),
        status: parse_quantity(value.get("status")).map(|s| s == 1),
        contract_address,
        gas_used: parse_quantity(value.get("gasUsed")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ens_core::ErrorKind;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_rpc(result: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": result
            })))
            .mount(&server)
            .await;
        server
    }

    async fn mock_rpc_error(code: i64, message: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": code, "message": message }
            })))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_rejects_invalid_url() {
        let err = HttpTransport::new("not a url").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_http_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.rpc_url, DEFAULT_ETH_RPC_URL);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(HttpConfig::new("http://x").with_timeout(5).timeout_seconds, 5);
    }

    #[test]
    fn test_decode_hex_data() {
        assert!(decode_hex_data("0x").unwrap().is_empty());
        assert_eq!(decode_hex_data("0xdead").unwrap().as_ref(), &[0xde, 0xad]);
        assert!(decode_hex_data("0xzz").is_err());
    }

    #[tokio::test]
    async fn test_eth_call_returns_data() {
        let server = mock_rpc(json!("0x000000000000000000000000000000000000000000000000000000000000002a")).await;
        let transport = HttpTransport::new(server.uri()).unwrap();

        let data = transport.call(Address::repeat_byte(1), Bytes::new()).await.unwrap();
        assert_eq!(data.len(), 32);
        assert_eq!(data[31], 0x2a);
    }

    #[tokio::test]
    async fn test_eth_call_sends_latest_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_call", "params": [{}, "latest"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": "0x"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri()).unwrap();
        let data = transport.call(Address::ZERO, Bytes::new()).await.unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_revert_error_is_classified() {
        let server = mock_rpc_error(-32000, "VM Exception while processing transaction: invalid JUMP").await;
        let transport = HttpTransport::new(server.uri()).unwrap();

        let err = transport.call(Address::ZERO, Bytes::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
        assert!(err.to_string().contains("invalid JUMP"));
    }

    #[tokio::test]
    async fn test_plain_rpc_error_propagates() {
        let server = mock_rpc_error(-32601, "the method eth_call does not exist").await;
        let transport = HttpTransport::new(server.uri()).unwrap();

        let err = transport.call(Address::ZERO, Bytes::new()).await.unwrap_err();
        assert!(matches!(err, EnsError::Rpc { code: -32601, .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_http_failure_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(server.uri()).unwrap();
        let err = transport.accounts().await.unwrap_err();
        assert!(matches!(err, EnsError::Transport(_)));
    }

    #[tokio::test]
    async fn test_accounts() {
        let server = mock_rpc(json!(["0x1111111111111111111111111111111111111111"])).await;
        let transport = HttpTransport::new(server.uri()).unwrap();

        let accounts = transport.accounts().await.unwrap();
        assert_eq!(accounts, vec![Address::repeat_byte(0x11)]);
    }

    #[tokio::test]
    async fn test_send_transaction_returns_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        let server = mock_rpc(json!(hash)).await;
        let transport = HttpTransport::new(server.uri()).unwrap();

        let tx = TransactionRequest {
            from: Address::repeat_byte(1),
            to: Address::repeat_byte(2),
            data: Bytes::from(vec![1, 2, 3]),
            gas: Some(100_000),
            gas_price: None,
            value: None,
        };
        assert_eq!(transport.send_transaction(tx).await.unwrap(), B256::repeat_byte(0xab));
    }

    #[tokio::test]
    async fn test_pending_receipt_is_none() {
        let server = mock_rpc(Value::Null).await;
        let transport = HttpTransport::new(server.uri()).unwrap();

        assert!(transport.transaction_receipt(B256::ZERO).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mined_receipt_is_parsed() {
        let server = mock_rpc(json!({
            "transactionHash": format!("0x{}", "cd".repeat(32)),
            "blockNumber": "0x10",
            "status": "0x1",
            "contractAddress": null,
            "gasUsed": "0x5208"
        }))
        .await;
        let transport = HttpTransport::new(server.uri()).unwrap();

        let receipt = transport.transaction_receipt(B256::ZERO).await.unwrap().unwrap();
        assert_eq!(receipt.transaction_hash, B256::repeat_byte(0xcd));
        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(receipt.gas_used, Some(21_000));
        assert!(receipt.succeeded());
        assert!(receipt.contract_address.is_none());
    }
}
