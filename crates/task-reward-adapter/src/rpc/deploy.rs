/*
[INPUT]:  Compiled contract artifact and deploying account
[OUTPUT]: Address of the deployed contract
[POS]:    RPC layer - one-shot contract deployment
[UPDATE]: When artifact format or deployment flow changes
*/

use alloy_primitives::{Address, Bytes};
use serde_json::Value;
use tracing::info;

use crate::rpc::{GatewayError, Result, RpcClient};
use crate::types::TransactionRequest;

/// Extract creation bytecode from a compiler artifact
/// (`{"bytecode": "0x..."}` or `{"bytecode": {"object": "..."}}`).
pub fn bytecode_from_artifact(artifact: &Value) -> Result<Bytes> {
    let raw = match artifact.get("bytecode") {
        Some(Value::String(code)) => code.as_str(),
        Some(Value::Object(object)) => object
            .get("object")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::Config("artifact bytecode.object missing".to_string()))?,
        _ => return Err(GatewayError::Config("artifact has no bytecode".to_string())),
    };
    let hex_code = raw.strip_prefix("0x").unwrap_or(raw);
    if hex_code.is_empty() {
        return Err(GatewayError::Config(
            "artifact bytecode is empty (abstract contract or interface?)".to_string(),
        ));
    }
    let code = hex::decode(hex_code)
        .map_err(|err| GatewayError::Config(format!("artifact bytecode is not hex: {err}")))?;
    Ok(Bytes::from(code))
}

impl RpcClient {
    /// Send a contract-creation transaction and wait for its receipt.
    pub async fn deploy_contract(&self, from: Address, bytecode: Bytes) -> Result<Address> {
        let tx = TransactionRequest {
            from: Some(from),
            to: None,
            value: None,
            data: bytecode,
        };
        let tx_hash = self.send_transaction(tx).await?;
        info!(tx_hash = %tx_hash, from = %from, "deployment sent");

        let receipt = self.wait_for_confirmation(tx_hash).await?;
        receipt.contract_address.ok_or_else(|| {
            GatewayError::InvalidResponse(format!("receipt of {tx_hash} has no contractAddress"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bytecode_from_hardhat_artifact() {
        let artifact = json!({ "contractName": "TaskRewardPlatform", "bytecode": "0x6080" });
        let code = bytecode_from_artifact(&artifact).unwrap();
        assert_eq!(code.as_ref(), &[0x60, 0x80]);
    }

    #[test]
    fn test_bytecode_from_foundry_artifact() {
        let artifact = json!({ "bytecode": { "object": "6080" } });
        let code = bytecode_from_artifact(&artifact).unwrap();
        assert_eq!(code.len(), 2);
    }

    #[test]
    fn test_bytecode_rejects_empty_and_missing() {
        assert!(bytecode_from_artifact(&json!({ "bytecode": "0x" })).is_err());
        assert!(bytecode_from_artifact(&json!({ "abi": [] })).is_err());
        assert!(bytecode_from_artifact(&json!({ "bytecode": "0xzz" })).is_err());
    }
}
