#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts)]
#![allow(missing_docs)]

pub mod account;
pub mod constants;
pub mod method;
pub mod rpc_result;

pub use account::Account;
pub use method::RpcMethod;
pub use rpc_result::{RpcResult, Status};
