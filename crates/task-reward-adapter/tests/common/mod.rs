/*
[INPUT]:  Seeded accounts and task tuples
[OUTPUT]: wiremock-backed JSON-RPC node serving the task contract
[POS]:    Test infrastructure - shared across integration tests
[UPDATE]: When the contract interface or RPC methods used change
*/

//! Common test utilities for task-reward-adapter tests

use std::sync::{Arc, Mutex};

use alloy_sol_types::SolCall;
use serde_json::{Value, json};
use task_reward_adapter::contract::abi::{
    ITaskRewardPlatform, encode_task_count_return, encode_task_return,
};
use task_reward_adapter::{Address, B256, Bytes, RawTask, U256};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const CONTRACT: Address = Address::new([0x5f; 20]);

pub fn alice() -> Address {
    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        .parse()
        .expect("valid address")
}

pub fn bob() -> Address {
    "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
        .parse()
        .expect("valid address")
}

pub fn raw_task(creator: Address, title: &str, status: u8, solver: Address) -> RawTask {
    RawTask(
        creator,
        title.to_string(),
        format!("{title} description"),
        U256::from(1_000_000_000_000_000_000u64),
        U256::from(4_102_444_800u64),
        status,
        solver,
    )
}

#[derive(Debug, Default)]
pub struct NodeState {
    pub accounts: Vec<Address>,
    pub tasks: Vec<RawTask>,
    /// `(to, value, data)` of every eth_sendTransaction
    pub sent: Vec<(Option<Address>, Option<U256>, Bytes)>,
}

/// JSON-RPC node answering the methods the gateway uses.
pub struct FakeNode {
    pub server: MockServer,
    pub state: Arc<Mutex<NodeState>>,
}

impl FakeNode {
    pub async fn start(accounts: Vec<Address>, tasks: Vec<RawTask>) -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(Mutex::new(NodeState {
            accounts,
            tasks,
            sent: Vec::new(),
        }));

        let shared = Arc::clone(&state);
        Mock::given(method("POST"))
            .respond_with(move |request: &Request| {
                let body: Value = serde_json::from_slice(&request.body).expect("json body");
                let mut state = shared.lock().expect("node state");
                let result = dispatch(&mut state, &body);
                ResponseTemplate::new(200).set_body_json(match result {
                    Ok(result) => json!({ "jsonrpc": "2.0", "id": body["id"], "result": result }),
                    Err((code, message)) => json!({
                        "jsonrpc": "2.0",
                        "id": body["id"],
                        "error": { "code": code, "message": message },
                    }),
                })
            })
            .mount(&server)
            .await;

        Self { server, state }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn sent(&self) -> Vec<(Option<Address>, Option<U256>, Bytes)> {
        self.state.lock().expect("node state").sent.clone()
    }
}

fn dispatch(state: &mut NodeState, body: &Value) -> Result<Value, (i64, String)> {
    let params = &body["params"];
    match body["method"].as_str().unwrap_or_default() {
        "eth_chainId" => Ok(json!("0x7a69")),
        "eth_accounts" | "eth_requestAccounts" => Ok(json!(state.accounts)),
        "eth_call" => {
            let data: Bytes = serde_json::from_value(params[0]["data"].clone())
                .map_err(|err| (-32602, err.to_string()))?;
            call(state, &data).map(|bytes| json!(bytes))
        }
        "eth_sendTransaction" => {
            let tx = &params[0];
            let to = serde_json::from_value(tx["to"].clone()).ok();
            let value = serde_json::from_value(tx["value"].clone()).ok();
            let data: Bytes = serde_json::from_value(tx["data"].clone())
                .map_err(|err| (-32602, err.to_string()))?;
            state.sent.push((to, value, data));
            Ok(json!(B256::from(U256::from(state.sent.len() as u64))))
        }
        "eth_getTransactionReceipt" => Ok(json!({
            "transactionHash": params[0],
            "blockNumber": "0x1",
            "status": "0x1",
            "contractAddress": Value::Null,
        })),
        other => Err((-32601, format!("method {other} not found"))),
    }
}

fn call(state: &NodeState, data: &[u8]) -> Result<Bytes, (i64, String)> {
    let selector: [u8; 4] = data
        .get(..4)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or((-32602, "missing selector".to_string()))?;

    if selector == ITaskRewardPlatform::taskCountCall::SELECTOR {
        return Ok(encode_task_count_return(state.tasks.len() as u64));
    }
    if selector == ITaskRewardPlatform::tasksCall::SELECTOR {
        let call = ITaskRewardPlatform::tasksCall::abi_decode(data)
            .map_err(|err| (-32602, err.to_string()))?;
        let index = call.id.to::<usize>();
        return state
            .tasks
            .get(index.wrapping_sub(1))
            .map(encode_task_return)
            .ok_or((3, "execution reverted".to_string()));
    }
    Err((3, "execution reverted: unknown selector".to_string()))
}
