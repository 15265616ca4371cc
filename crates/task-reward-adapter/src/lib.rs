/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public TaskRewardPlatform adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod contract;
pub mod rpc;
pub mod types;
pub mod units;

// Re-export commonly used types from contract
pub use contract::{TaskGateway, TaskRewardContract};
#[cfg(any(test, feature = "test-util"))]
pub use contract::MockTaskGateway;

// Re-export commonly used types from rpc
pub use rpc::{ClientConfig, ConfirmationConfig, GatewayError, Result, RpcClient};

// Re-export all types
pub use types::*;

pub use units::{UnitsError, ether_to_wei, format_ether, parse_ether};

pub use alloy_primitives::{Address, B256, Bytes, U256};
