/*
[INPUT]:  Error sources (HTTP, JSON-RPC, ABI decoding, receipts, configuration)
[OUTPUT]: Structured gateway error type with classification helpers
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use alloy_primitives::B256;
use thiserror::Error;

use crate::types::RpcErrorObject;

/// Main error type for the TaskRewardPlatform gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP transport failed (node unreachable, connection reset, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Node answered with a JSON-RPC error object
    #[error("RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    /// Transaction was mined but reverted
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    /// No receipt before the confirmation deadline
    #[error("transaction {tx_hash} not confirmed after {waited_secs}s")]
    ConfirmationTimeout { tx_hash: B256, waited_secs: u64 },

    /// Wallet exposes no accounts (locked or disconnected)
    #[error("wallet returned no accounts")]
    NoAccounts,

    /// Return data could not be ABI-decoded or has unexpected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from node
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request timed out
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },
}

/// JSON-RPC code used by geth/hardhat/anvil for `execution reverted`.
const EXECUTION_REVERTED_CODE: i64 = 3;

impl GatewayError {
    /// Wallet or node could not be reached, or answered nonsense.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            GatewayError::Http(_)
                | GatewayError::Timeout { .. }
                | GatewayError::NoAccounts
                | GatewayError::InvalidResponse(_)
                | GatewayError::Serialization(_)
        )
    }

    /// The contract (or the node simulating it) refused the request.
    ///
    /// The revert reason is not decoded.
    pub fn is_contract_rejection(&self) -> bool {
        match self {
            GatewayError::Reverted { .. } => true,
            GatewayError::Rpc { code, message } => {
                *code == EXECUTION_REVERTED_CODE || message.to_ascii_lowercase().contains("revert")
            }
            _ => false,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        GatewayError::Decode(message.into())
    }
}

impl From<RpcErrorObject> for GatewayError {
    fn from(error: RpcErrorObject) -> Self {
        GatewayError::Rpc {
            code: error.code,
            message: error.message,
        }
    }
}

impl From<alloy_sol_types::Error> for GatewayError {
    fn from(error: alloy_sol_types::Error) -> Self {
        GatewayError::Decode(error.to_string())
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let timeout_err = GatewayError::Timeout { duration: 30 };
        assert!(timeout_err.is_connectivity());
        assert!(!timeout_err.is_contract_rejection());

        let reverted = GatewayError::Reverted {
            tx_hash: B256::ZERO,
        };
        assert!(reverted.is_contract_rejection());
        assert!(!reverted.is_connectivity());
    }

    #[test]
    fn test_rpc_revert_is_rejection() {
        let err = GatewayError::from(RpcErrorObject {
            code: -32603,
            message: "Error: VM Exception while processing transaction: reverted with reason string 'not creator'".to_string(),
            data: None,
        });
        assert!(err.is_contract_rejection());

        let err = GatewayError::Rpc {
            code: EXECUTION_REVERTED_CODE,
            message: "execution failed".to_string(),
        };
        assert!(err.is_contract_rejection());
    }

    #[test]
    fn test_rpc_error_message() {
        let err = GatewayError::Rpc {
            code: -32601,
            message: "method not found".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error (code -32601): method not found");
        assert!(!err.is_contract_rejection());
    }
}
