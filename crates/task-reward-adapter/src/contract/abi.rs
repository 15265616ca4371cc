/*
[INPUT]:  TaskRewardPlatform Solidity interface
[OUTPUT]: ABI call encoders and return decoders
[POS]:    Contract layer - ABI definitions
[UPDATE]: When the deployed contract interface changes
*/

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolType, SolValue, sol, sol_data};

use crate::rpc::Result;
use crate::types::{NewTaskRequest, RawTask};

sol! {
    /// Public surface of the TaskRewardPlatform contract.
    interface ITaskRewardPlatform {
        function taskCount() external view returns (uint256);
        function tasks(uint256 id) external view returns (
            address creator,
            string title,
            string description,
            uint256 reward,
            uint256 deadline,
            uint8 status,
            address solver
        );
        function createTask(string title, string description, uint256 deadline) external payable;
        function takeTask(uint256 id) external;
        function submitTask(uint256 id) external;
        function cancelTask(uint256 id) external;
    }
}

/// Return layout of `tasks(uint256)`; `status` is a `uint8` on chain.
type TaskTuple = (
    sol_data::Address,
    sol_data::String,
    sol_data::String,
    sol_data::Uint<256>,
    sol_data::Uint<256>,
    sol_data::Uint<8>,
    sol_data::Address,
);

pub fn encode_task_count() -> Bytes {
    ITaskRewardPlatform::taskCountCall {}.abi_encode().into()
}

pub fn encode_task(id: u64) -> Bytes {
    ITaskRewardPlatform::tasksCall { id: U256::from(id) }
        .abi_encode()
        .into()
}

pub fn encode_create_task(request: &NewTaskRequest) -> Bytes {
    ITaskRewardPlatform::createTaskCall {
        title: request.title.clone(),
        description: request.description.clone(),
        deadline: U256::from(request.deadline),
    }
    .abi_encode()
    .into()
}

pub fn encode_take_task(id: u64) -> Bytes {
    ITaskRewardPlatform::takeTaskCall { id: U256::from(id) }
        .abi_encode()
        .into()
}

pub fn encode_submit_task(id: u64) -> Bytes {
    ITaskRewardPlatform::submitTaskCall { id: U256::from(id) }
        .abi_encode()
        .into()
}

pub fn encode_cancel_task(id: u64) -> Bytes {
    ITaskRewardPlatform::cancelTaskCall { id: U256::from(id) }
        .abi_encode()
        .into()
}

pub fn decode_task_count(data: &[u8]) -> Result<U256> {
    Ok(<U256 as SolValue>::abi_decode(data)?)
}

/// Decode the seven return values of `tasks(uint256)` positionally.
pub fn decode_task(data: &[u8]) -> Result<RawTask> {
    let (creator, title, description, reward, deadline, status, solver) =
        <TaskTuple as SolType>::abi_decode_params(data)?;
    Ok(RawTask(
        creator,
        title,
        description,
        reward,
        deadline,
        status,
        solver,
    ))
}

/// Inverse of [`decode_task`]; used by fakes and tests.
pub fn encode_task_return(task: &RawTask) -> Bytes {
    let tuple = (
        task.0,
        task.1.clone(),
        task.2.clone(),
        task.3,
        task.4,
        task.5,
        task.6,
    );
    <TaskTuple as SolType>::abi_encode_params(&tuple).into()
}

pub fn encode_task_count_return(count: u64) -> Bytes {
    U256::from(count).abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_selectors_match_solidity_signatures() {
        assert_eq!(
            ITaskRewardPlatform::taskCountCall::SIGNATURE,
            "taskCount()"
        );
        assert_eq!(ITaskRewardPlatform::tasksCall::SIGNATURE, "tasks(uint256)");
        assert_eq!(
            ITaskRewardPlatform::createTaskCall::SIGNATURE,
            "createTask(string,string,uint256)"
        );
        assert_eq!(&encode_task(1)[..4], &ITaskRewardPlatform::tasksCall::SELECTOR);
    }

    #[test]
    fn test_task_call_encodes_id() {
        let data = encode_task(3);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(data[35], 3);
    }

    #[test]
    fn test_decode_task_tuple() {
        let task = RawTask(
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            "Fix the bridge".to_string(),
            "Replace planks".to_string(),
            U256::from(500_000_000_000_000_000u128),
            U256::from(1_700_000_000u64),
            1,
            address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
        );
        let encoded = encode_task_return(&task);
        assert_eq!(decode_task(&encoded).unwrap(), task);
    }

    #[test]
    fn test_status_occupies_sixth_word() {
        let task = RawTask(
            Address::ZERO,
            String::new(),
            String::new(),
            U256::from(1u64),
            U256::from(2u64),
            3,
            Address::repeat_byte(0x11),
        );
        let encoded = encode_task_return(&task);
        assert_eq!(encoded[5 * 32 + 31], 3);
        assert_eq!(decode_task(&encoded).unwrap().status(), 3);
    }

    #[test]
    fn test_decode_task_rejects_truncated_data() {
        let encoded = encode_task_return(&RawTask(
            Address::ZERO,
            "t".to_string(),
            String::new(),
            U256::ZERO,
            U256::ZERO,
            0,
            Address::ZERO,
        ));
        assert!(decode_task(&encoded[..64]).is_err());
    }

    #[test]
    fn test_decode_task_count() {
        assert_eq!(
            decode_task_count(&encode_task_count_return(42)).unwrap(),
            U256::from(42)
        );
        assert!(decode_task_count(&[]).is_err());
    }
}
