/*
[INPUT]:  RPC configuration (node URL, timeouts, confirmation policy)
[OUTPUT]: Configured reqwest-backed JSON-RPC client ready for node calls
[POS]:    RPC layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes, U64};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::rpc::{GatewayError, Result};
use crate::types::{RpcRequest, RpcResponse, TransactionReceipt, TransactionRequest};

/// Default endpoint of a local development node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// JSON-RPC "method not found"
const METHOD_NOT_FOUND: i64 = -32601;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// How transaction confirmation is awaited
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
        }
    }
}

/// JSON-RPC client for a wallet node.
///
/// The node manages the accounts and signs transactions, the way a browser
/// wallet does for a web page.
#[derive(Debug)]
pub struct RpcClient {
    http_client: Client,
    rpc_url: Url,
    request_timeout: Duration,
    pub(crate) confirmation: ConfirmationConfig,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a new client with default configuration
    pub fn new(rpc_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), rpc_url)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, rpc_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            rpc_url: Url::parse(rpc_url)?,
            request_timeout: config.timeout,
            confirmation: ConfirmationConfig::default(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Replace the confirmation policy
    pub fn with_confirmation(mut self, confirmation: ConfirmationConfig) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Send one JSON-RPC request and return its `result`, which may be null.
    pub async fn request_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest::new(id, method, params);
        debug!(method, id, "rpc request");

        let response = self
            .http_client
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;

        let envelope: RpcResponse<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(GatewayError::InvalidResponse(format!(
                    "HTTP {status} from {method}: {text}"
                )));
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(error) = envelope.error {
            debug!(method, id, code = error.code, message = %error.message, "rpc error");
            return Err(error.into());
        }
        Ok(envelope.result)
    }

    /// Send one JSON-RPC request whose `result` must be present.
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        self.request_optional(method, params)
            .await?
            .ok_or_else(|| GatewayError::InvalidResponse(format!("{method} returned no result")))
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64> {
        let id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(id.to::<u64>())
    }

    /// `eth_accounts`: accounts currently exposed by the wallet
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_accounts", json!([])).await
    }

    /// `eth_requestAccounts`, falling back to `eth_accounts` on nodes that
    /// do not implement the connect request.
    pub async fn request_accounts(&self) -> Result<Vec<Address>> {
        let accounts = match self.request("eth_requestAccounts", json!([])).await {
            Ok(accounts) => accounts,
            Err(GatewayError::Rpc { code, .. }) if code == METHOD_NOT_FOUND => {
                debug!("eth_requestAccounts unsupported; using eth_accounts");
                self.accounts().await?
            }
            Err(err) => return Err(err),
        };
        if accounts.is_empty() {
            return Err(GatewayError::NoAccounts);
        }
        Ok(accounts)
    }

    /// `eth_call` against the latest block
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest {
            from: None,
            to: Some(to),
            value: None,
            data,
        };
        self.request("eth_call", json!([tx, "latest"])).await
    }

    /// `eth_sendTransaction`: the wallet signs and broadcasts
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<B256> {
        self.request("eth_sendTransaction", json!([tx])).await
    }

    /// `eth_getTransactionReceipt`; `None` while pending
    pub async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        self.request_optional("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                duration: self.request_timeout.as_secs(),
            }
        } else {
            GatewayError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rpc_result(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result,
        }))
    }

    #[test]
    fn test_client_rejects_bad_url() {
        let err = RpcClient::new("not a url").unwrap_err();
        assert!(matches!(err, GatewayError::UrlParse(_)));
    }

    #[tokio::test]
    async fn test_chain_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_chainId" })))
            .respond_with(rpc_result(json!("0x7a69")))
            .expect(1)
            .mount(&server)
            .await;

        let client = RpcClient::new(&server.uri()).expect("client init");
        assert_eq!(client.chain_id().await.expect("chain id"), 31337);
    }

    #[tokio::test]
    async fn test_request_accounts_falls_back_to_eth_accounts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_requestAccounts" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32601, "message": "method not found" },
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_accounts" })))
            .respond_with(rpc_result(json!([
                "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
            ])))
            .mount(&server)
            .await;

        let client = RpcClient::new(&server.uri()).expect("client init");
        let accounts = client.request_accounts().await.expect("accounts");
        assert_eq!(accounts.len(), 1);
        assert_eq!(
            accounts[0],
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_request_accounts_empty_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(rpc_result(json!([])))
            .mount(&server)
            .await;

        let client = RpcClient::new(&server.uri()).expect("client init");
        let err = client.request_accounts().await.unwrap_err();
        assert!(matches!(err, GatewayError::NoAccounts));
        assert!(err.is_connectivity());
    }

    #[tokio::test]
    async fn test_rpc_error_object_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": 3, "message": "execution reverted" },
            })))
            .mount(&server)
            .await;

        let client = RpcClient::new(&server.uri()).expect("client init");
        let err = client
            .send_transaction(TransactionRequest {
                from: None,
                to: None,
                value: None,
                data: Bytes::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_contract_rejection());
    }

    #[tokio::test]
    async fn test_http_failure_without_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = RpcClient::new(&server.uri()).expect("client init");
        let err = client.chain_id().await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
        assert!(err.is_connectivity());
    }

    #[tokio::test]
    async fn test_pending_receipt_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(rpc_result(Value::Null))
            .mount(&server)
            .await;

        let client = RpcClient::new(&server.uri()).expect("client init");
        let receipt = client.transaction_receipt(B256::ZERO).await.expect("receipt");
        assert!(receipt.is_none());
    }
}
