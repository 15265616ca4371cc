/*
[INPUT]:  JSON-RPC response bodies from the wallet node
[OUTPUT]: Typed response envelopes
[POS]:    Data layer - response definitions
[UPDATE]: When RPC envelope handling changes
*/

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub id: Option<Value>,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}
