/*
[INPUT]:  Seeded accounts/tasks and injected failures
[OUTPUT]: In-memory TaskGateway that behaves like the contract
[POS]:    Contract layer - test double for the chain gateway
[UPDATE]: When TaskGateway gains methods or contract rules change
*/

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_primitives::{Address, B256, U64, U256};
use async_trait::async_trait;

use crate::contract::TaskGateway;
use crate::rpc::{GatewayError, Result};
use crate::types::{NewTaskRequest, RawTask, TaskStatus, TransactionReceipt};

/// A transaction accepted by [`MockTaskGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    pub tx_hash: B256,
    pub from: Address,
    pub action: &'static str,
    pub task_id: Option<u64>,
    pub value: U256,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: Vec<Address>,
    tasks: Vec<RawTask>,
    failing_reads: HashSet<u64>,
    fail_count: bool,
    reject_sends: bool,
    revert_on_confirm: bool,
    sent: Vec<SentTransaction>,
}

/// In-memory gateway applying the contract's rules to a local task list.
///
/// Counts reads and tracks how many task reads were in flight at once.
#[derive(Debug, Default)]
pub struct MockTaskGateway {
    state: Mutex<MockState>,
    count_reads: AtomicUsize,
    task_reads: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn reverted(reason: &str) -> GatewayError {
    GatewayError::Rpc {
        code: 3,
        message: format!("execution reverted: {reason}"),
    }
}

impl MockTaskGateway {
    pub fn new(accounts: Vec<Address>) -> Self {
        let gateway = Self::default();
        gateway.lock().accounts = accounts;
        gateway
    }

    pub fn with_tasks(self, tasks: Vec<RawTask>) -> Self {
        self.lock().tasks = tasks;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock gateway lock")
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.lock().accounts = accounts;
    }

    pub fn set_tasks(&self, tasks: Vec<RawTask>) {
        self.lock().tasks = tasks;
    }

    /// Make reads of `id` fail until cleared
    pub fn fail_task_read(&self, id: u64) {
        self.lock().failing_reads.insert(id);
    }

    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.failing_reads.clear();
        state.fail_count = false;
        state.reject_sends = false;
        state.revert_on_confirm = false;
    }

    pub fn fail_count_read(&self) {
        self.lock().fail_count = true;
    }

    /// Wallet refuses every transaction
    pub fn reject_sends(&self) {
        self.lock().reject_sends = true;
    }

    /// Transactions are accepted but their receipts report a revert
    pub fn revert_on_confirm(&self) {
        self.lock().revert_on_confirm = true;
    }

    pub fn count_reads(&self) -> usize {
        self.count_reads.load(Ordering::SeqCst)
    }

    pub fn task_reads(&self) -> usize {
        self.task_reads.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn reset_counters(&self) {
        self.count_reads.store(0, Ordering::SeqCst);
        self.task_reads.store(0, Ordering::SeqCst);
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentTransaction> {
        self.lock().sent.clone()
    }

    pub fn tasks(&self) -> Vec<RawTask> {
        self.lock().tasks.clone()
    }

    fn record(
        state: &mut MockState,
        from: Address,
        action: &'static str,
        task_id: Option<u64>,
        value: U256,
    ) -> B256 {
        let tx_hash = B256::from(U256::from(state.sent.len() as u64 + 1));
        state.sent.push(SentTransaction {
            tx_hash,
            from,
            action,
            task_id,
            value,
        });
        tx_hash
    }

    fn transition(
        &self,
        from: Address,
        id: u64,
        action: &'static str,
        apply: impl FnOnce(&mut RawTask, Address) -> std::result::Result<(), &'static str>,
    ) -> Result<B256> {
        let mut state = self.lock();
        if state.reject_sends {
            return Err(GatewayError::Rpc {
                code: 4001,
                message: "User rejected the request".to_string(),
            });
        }
        let index = usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .filter(|index| *index < state.tasks.len())
            .ok_or_else(|| reverted("task does not exist"))?;
        apply(&mut state.tasks[index], from).map_err(reverted)?;
        Ok(Self::record(&mut state, from, action, Some(id), U256::ZERO))
    }
}

#[async_trait]
impl TaskGateway for MockTaskGateway {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        let accounts = self.lock().accounts.clone();
        if accounts.is_empty() {
            return Err(GatewayError::NoAccounts);
        }
        Ok(accounts)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.lock().accounts.clone())
    }

    async fn task_count(&self) -> Result<U256> {
        self.count_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.lock();
        if state.fail_count {
            return Err(GatewayError::InvalidResponse(
                "injected taskCount failure".to_string(),
            ));
        }
        Ok(U256::from(state.tasks.len() as u64))
    }

    async fn task(&self, id: u64) -> Result<RawTask> {
        self.task_reads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::task::yield_now().await;

        let result = {
            let state = self.lock();
            if state.failing_reads.contains(&id) {
                Err(GatewayError::InvalidResponse(format!(
                    "injected failure reading task {id}"
                )))
            } else {
                // Unknown ids read as the zero tuple, like a Solidity mapping.
                let task = usize::try_from(id)
                    .ok()
                    .and_then(|id| id.checked_sub(1))
                    .and_then(|index| state.tasks.get(index).cloned())
                    .unwrap_or_else(|| {
                        RawTask(
                            Address::ZERO,
                            String::new(),
                            String::new(),
                            U256::ZERO,
                            U256::ZERO,
                            0,
                            Address::ZERO,
                        )
                    });
                Ok(task)
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn create_task(&self, from: Address, request: &NewTaskRequest) -> Result<B256> {
        let mut state = self.lock();
        if state.reject_sends {
            return Err(GatewayError::Rpc {
                code: 4001,
                message: "User rejected the request".to_string(),
            });
        }
        if request.reward_wei.is_zero() {
            return Err(reverted("reward must be positive"));
        }
        state.tasks.push(RawTask(
            from,
            request.title.clone(),
            request.description.clone(),
            request.reward_wei,
            U256::from(request.deadline),
            TaskStatus::Open.as_u8(),
            Address::ZERO,
        ));
        let id = state.tasks.len() as u64;
        Ok(Self::record(
            &mut state,
            from,
            "createTask",
            Some(id),
            request.reward_wei,
        ))
    }

    async fn take_task(&self, from: Address, id: u64) -> Result<B256> {
        self.transition(from, id, "takeTask", |task, from| {
            if task.5 != TaskStatus::Open.as_u8() {
                return Err("task is not open");
            }
            if task.0 == from {
                return Err("creator cannot take own task");
            }
            task.5 = TaskStatus::InProgress.as_u8();
            task.6 = from;
            Ok(())
        })
    }

    async fn submit_task(&self, from: Address, id: u64) -> Result<B256> {
        self.transition(from, id, "submitTask", |task, from| {
            if task.5 != TaskStatus::InProgress.as_u8() {
                return Err("task is not in progress");
            }
            if task.6 != from {
                return Err("only the solver can submit");
            }
            task.5 = TaskStatus::Completed.as_u8();
            Ok(())
        })
    }

    async fn cancel_task(&self, from: Address, id: u64) -> Result<B256> {
        self.transition(from, id, "cancelTask", |task, from| {
            if task.5 != TaskStatus::Open.as_u8() {
                return Err("task is not open");
            }
            if task.0 != from {
                return Err("only the creator can cancel");
            }
            task.5 = TaskStatus::Cancelled.as_u8();
            Ok(())
        })
    }

    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        let state = self.lock();
        if state.revert_on_confirm {
            return Err(GatewayError::Reverted { tx_hash });
        }
        let sent = state
            .sent
            .iter()
            .find(|sent| sent.tx_hash == tx_hash)
            .ok_or_else(|| GatewayError::InvalidResponse(format!("unknown transaction {tx_hash}")))?;
        Ok(TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(U64::from(state.sent.len() as u64)),
            status: Some(U64::from(1)),
            contract_address: None,
            from: Some(sent.from),
            gas_used: None,
        })
    }
}
