/*
[INPUT]:  Contract address, RPC client, task calls
[OUTPUT]: TaskGateway trait and its RPC-backed and mock implementations
[POS]:    Contract layer - the seam between UI logic and the chain
[UPDATE]: When contract functions or gateway methods change
*/

pub mod abi;
pub mod gateway;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use gateway::{TaskGateway, TaskRewardContract};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockTaskGateway, SentTransaction};
