/*
[INPUT]:  Transaction hash from eth_sendTransaction
[OUTPUT]: Successful receipt, or Reverted / ConfirmationTimeout
[POS]:    RPC layer - confirmation polling
[UPDATE]: When confirmation policy changes
*/

use alloy_primitives::B256;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::rpc::{GatewayError, Result, RpcClient};
use crate::types::TransactionReceipt;

impl RpcClient {
    /// Poll for the receipt of `tx_hash` until it is mined or the
    /// confirmation timeout elapses. Yields to the runtime between polls.
    pub async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                if receipt.succeeded() {
                    info!(
                        tx_hash = %tx_hash,
                        block = ?receipt.block_number,
                        "transaction confirmed"
                    );
                    return Ok(receipt);
                }
                warn!(tx_hash = %tx_hash, "transaction reverted");
                return Err(GatewayError::Reverted { tx_hash });
            }

            let waited = started.elapsed();
            if waited >= self.confirmation.timeout {
                warn!(tx_hash = %tx_hash, waited_secs = waited.as_secs(), "confirmation timed out");
                return Err(GatewayError::ConfirmationTimeout {
                    tx_hash,
                    waited_secs: waited.as_secs(),
                });
            }
            debug!(tx_hash = %tx_hash, "receipt pending");
            tokio::time::sleep(self.confirmation.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::rpc::{ClientConfig, ConfirmationConfig, GatewayError, RpcClient};
    use alloy_primitives::B256;

    const TX_HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    fn fast_client(uri: &str) -> RpcClient {
        RpcClient::with_config(ClientConfig::default(), uri)
            .expect("client init")
            .with_confirmation(ConfirmationConfig {
                poll_interval: Duration::from_millis(10),
                timeout: Duration::from_millis(200),
            })
    }

    fn receipt(status: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "transactionHash": TX_HASH,
                "blockNumber": "0x2",
                "status": status,
            },
        }))
    }

    #[tokio::test]
    async fn test_waits_through_pending_receipts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": null,
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "eth_getTransactionReceipt" })))
            .respond_with(receipt("0x1"))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let hash: B256 = TX_HASH.parse().unwrap();
        let receipt = client.wait_for_confirmation(hash).await.expect("confirmed");
        assert_eq!(receipt.transaction_hash, hash);
    }

    #[tokio::test]
    async fn test_reverted_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(receipt("0x0"))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let err = client
            .wait_for_confirmation(TX_HASH.parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Reverted { .. }));
    }

    #[tokio::test]
    async fn test_confirmation_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": null,
            })))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let err = client
            .wait_for_confirmation(TX_HASH.parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ConfirmationTimeout { .. }));
    }
}
