/*
[INPUT]:  Caller intents (method + params, transactions, new tasks)
[OUTPUT]: Serializable JSON-RPC request bodies
[POS]:    Data layer - request definitions
[UPDATE]: When adding RPC methods or transaction fields
*/

use alloy_primitives::{Address, Bytes, U256};
use serde::Serialize;
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// Transaction object for `eth_call` and `eth_sendTransaction`.
///
/// `to: None` is a contract creation. Gas is left to the wallet node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    pub data: Bytes,
}

/// Arguments of `createTask`, with the reward already in wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRequest {
    pub title: String,
    pub description: String,
    /// Unix seconds.
    pub deadline: u64,
    /// Attached as the transaction value.
    pub reward_wei: U256,
}
