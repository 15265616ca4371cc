#![allow(dead_code)]

use std::sync::Arc;

use task_reward_adapter::{Address, MockTaskGateway, RawTask, U256};

/// Far enough out that nothing expires during a test run.
pub const FAR_DEADLINE: u64 = 4_102_444_800;

pub fn alice() -> Address {
    "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        .parse()
        .expect("valid address")
}

pub fn bob() -> Address {
    "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        .parse()
        .expect("valid address")
}

pub fn raw_task(creator: Address, title: &str, status: u8, solver: Address) -> RawTask {
    RawTask(
        creator,
        title.to_string(),
        format!("{title} description"),
        U256::from(1_000_000_000_000_000u64),
        U256::from(FAR_DEADLINE),
        status,
        solver,
    )
}

pub fn gateway(accounts: Vec<Address>, tasks: Vec<RawTask>) -> Arc<MockTaskGateway> {
    Arc::new(MockTaskGateway::new(accounts).with_tasks(tasks))
}
