/*
[INPUT]:  Wallet node (RpcClient) and deployed contract address
[OUTPUT]: TaskGateway trait plus the JSON-RPC backed implementation
[POS]:    Contract layer - chain gateway abstraction
[UPDATE]: When adding contract operations or changing the gateway contract
*/

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::contract::abi;
use crate::rpc::{Result, RpcClient};
use crate::types::{NewTaskRequest, RawTask, TransactionReceipt, TransactionRequest};

/// Everything the UI layer needs from the chain.
///
/// Reads are independent `eth_call`s. State-changing calls return as soon as
/// the wallet accepted the transaction; callers must await
/// [`TaskGateway::wait_for_confirmation`] before treating them as done.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Ask the wallet to connect and expose its accounts
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Accounts currently exposed, without prompting
    async fn accounts(&self) -> Result<Vec<Address>>;

    /// Number of tasks ever created; ids are `1..=count`
    async fn task_count(&self) -> Result<U256>;

    /// Raw tuple for one task id
    async fn task(&self, id: u64) -> Result<RawTask>;

    async fn create_task(&self, from: Address, request: &NewTaskRequest) -> Result<B256>;

    async fn take_task(&self, from: Address, id: u64) -> Result<B256>;

    async fn submit_task(&self, from: Address, id: u64) -> Result<B256>;

    async fn cancel_task(&self, from: Address, id: u64) -> Result<B256>;

    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<TransactionReceipt>;
}

/// TaskRewardPlatform deployed at `address`, reached through a wallet node
#[derive(Debug)]
pub struct TaskRewardContract {
    rpc: RpcClient,
    address: Address,
}

impl TaskRewardContract {
    pub fn new(rpc: RpcClient, address: Address) -> Self {
        Self { rpc, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    async fn transact(
        &self,
        from: Address,
        value: Option<U256>,
        data: alloy_primitives::Bytes,
        action: &'static str,
    ) -> Result<B256> {
        let tx = TransactionRequest {
            from: Some(from),
            to: Some(self.address),
            value,
            data,
        };
        let tx_hash = self.rpc.send_transaction(tx).await?;
        info!(action, from = %from, tx_hash = %tx_hash, "transaction sent");
        Ok(tx_hash)
    }
}

#[async_trait]
impl TaskGateway for TaskRewardContract {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.rpc.request_accounts().await
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        self.rpc.accounts().await
    }

    async fn task_count(&self) -> Result<U256> {
        let data = self.rpc.call(self.address, abi::encode_task_count()).await?;
        abi::decode_task_count(&data)
    }

    async fn task(&self, id: u64) -> Result<RawTask> {
        let data = self.rpc.call(self.address, abi::encode_task(id)).await?;
        debug!(id, bytes = data.len(), "task tuple fetched");
        abi::decode_task(&data)
    }

    async fn create_task(&self, from: Address, request: &NewTaskRequest) -> Result<B256> {
        self.transact(
            from,
            Some(request.reward_wei),
            abi::encode_create_task(request),
            "createTask",
        )
        .await
    }

    async fn take_task(&self, from: Address, id: u64) -> Result<B256> {
        self.transact(from, None, abi::encode_take_task(id), "takeTask")
            .await
    }

    async fn submit_task(&self, from: Address, id: u64) -> Result<B256> {
        self.transact(from, None, abi::encode_submit_task(id), "submitTask")
            .await
    }

    async fn cancel_task(&self, from: Address, id: u64) -> Result<B256> {
        self.transact(from, None, abi::encode_cancel_task(id), "cancelTask")
            .await
    }

    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        self.rpc.wait_for_confirmation(tx_hash).await
    }
}
