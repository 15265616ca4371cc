/*
[INPUT]:  ABI-decoded contract return values and node receipts
[OUTPUT]: Typed Rust structs for task tuples and transaction receipts
[POS]:    Data layer - type definitions for node communication
[UPDATE]: When the tasks(uint256) getter layout or receipt schema changes
*/

use alloy_primitives::{Address, B256, U64, U256};
use serde::{Deserialize, Serialize};

/// Positional task tuple exactly as returned by `tasks(uint256)`.
///
/// Field order: creator, title, description, reward (wei), deadline (unix
/// seconds), status, solver. The tuple carries no id; the id is the argument
/// that was used to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTask(
    pub Address,
    pub String,
    pub String,
    pub U256,
    pub U256,
    pub u8,
    pub Address,
);

impl RawTask {
    pub fn creator(&self) -> Address {
        self.0
    }

    pub fn title(&self) -> &str {
        &self.1
    }

    pub fn description(&self) -> &str {
        &self.2
    }

    pub fn reward_wei(&self) -> U256 {
        self.3
    }

    pub fn deadline(&self) -> U256 {
        self.4
    }

    pub fn status(&self) -> u8 {
        self.5
    }

    pub fn solver(&self) -> Address {
        self.6
    }
}

/// Subset of `eth_getTransactionReceipt` used for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `0x1` success, `0x0` reverted. Pre-Byzantium nodes omit it.
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(default)]
    pub gas_used: Option<U256>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map(|status| status == U64::from(1)).unwrap_or(true)
    }
}
