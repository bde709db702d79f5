//! # aabridge-rpc
//!
//! Wire types shared by the wallet connector and the session bridge:
//! - [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193) provider error codes
//! - JSON-RPC 2.0 response envelopes
//! - the closed set of wallet methods the bridge understands

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod error;
pub mod method;
pub mod request;
pub mod response;
pub mod typed_data;

pub use error::{ErrorCode, RpcError};
pub use method::RpcMethod;
pub use request::{TransactionIntent, WalletRequest};
pub use response::{Id, ResponseResult, RpcResponse};
pub use typed_data::TypedDataPayload;
