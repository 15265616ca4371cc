/*
[INPUT]:  Node URL, timeouts, JSON-RPC methods
[OUTPUT]: Typed JSON-RPC results, confirmations and deployments
[POS]:    RPC layer - wallet node communication
[UPDATE]: When adding RPC methods or changing client behavior
*/

pub mod client;
pub mod confirm;
pub mod deploy;
pub mod error;

pub use error::{GatewayError, Result};

pub use client::{ClientConfig, ConfirmationConfig, RpcClient};
pub use deploy::bytecode_from_artifact;
