/*
[INPUT]:  Contract ABI and JSON-RPC schema definitions
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - type definitions for node communication
[UPDATE]: When contract ABI or RPC schema changes
*/

pub mod enums;
pub mod models;
pub mod requests;
pub mod responses;

pub use enums::*;
pub use models::*;
pub use requests::*;
pub use responses::*;
