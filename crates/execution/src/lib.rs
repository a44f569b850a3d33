// crates/execution/src/lib.rs

pub mod client;
pub mod config;
pub mod error;
pub mod eth_rpc;
pub mod transport;

pub use client::EthClient;
pub use config::{ExecutionConfig, NodeEndpoint};
pub use error::ExecutionError;
pub use eth_rpc::EthRpc;
