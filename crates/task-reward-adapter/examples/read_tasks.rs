/*
[INPUT]:  RPC URL and contract address from the environment
[OUTPUT]: Console listing of every task on the contract
[POS]:    Examples - read-only contract access
[UPDATE]: When TaskGateway read methods change
*/

//! Example: list tasks straight from a node
//!
//! ```text
//! TASK_REWARD_RPC_URL=http://127.0.0.1:8545 \
//! TASK_REWARD_CONTRACT_ADDRESS=0x5FbDB2315678afecb367f032d93F642f64180aa3 \
//! cargo run --example read_tasks
//! ```

use task_reward_adapter::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let rpc_url = std::env::var("TASK_REWARD_RPC_URL")
        .unwrap_or_else(|_| rpc::client::DEFAULT_RPC_URL.to_string());
    let address: Address = std::env::var("TASK_REWARD_CONTRACT_ADDRESS")?.parse()?;

    let rpc = RpcClient::new(&rpc_url)?;
    println!("Chain id: {}", rpc.chain_id().await?);

    let contract = TaskRewardContract::new(rpc, address);
    let count = contract.task_count().await?;
    println!("{count} task(s)\n");

    let count = u64::try_from(count).map_err(|_| "task count out of range")?;
    for id in (1..=count).rev() {
        let task = contract.task(id).await?;
        let status = TaskStatus::try_from(task.status())
            .map(|status| status.label().to_string())
            .unwrap_or_else(|raw| format!("status {raw}"));
        println!(
            "#{id:<4} {:<32} {:>12} ETH  {status}",
            task.title(),
            format_ether(task.reward_wei())
        );
    }
    Ok(())
}
