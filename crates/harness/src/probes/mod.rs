//! One probe per JSON-RPC method, plus the prerequisites they share.

mod block;
mod call;
mod filter;
mod history;
mod prereq;
mod scalar;
mod send;
mod state;

pub use block::{BlockByHash, BlockByNumber, BlockReceipts};
pub use call::{Call, EstimateGas};
pub use filter::{FilterChanges, FilterLogs, Logs, NewBlockFilter, NewFilter, UninstallFilter};
pub use history::{
    BlockTransactionCountByHash, TransactionByBlockHashAndIndex, TransactionByBlockNumberAndIndex,
    TransactionByHash, TransactionCountByHash, TransactionReceipt,
};
pub use scalar::{Balance, BlockNumber, ChainId, GasPrice, MaxPriorityFeePerGas, TransactionCount};
pub use send::SendRawTransaction;
pub use state::{Code, StorageAt};
use serde::Serialize;

use crate::{error::ProbeError, probe::Probe};

/// The fixed order a run walks through. Sending comes first: almost everything after it reads
/// what the mined transactions left behind.
pub fn sequence() -> Vec<Box<dyn Probe>> {
    vec![
        Box::new(SendRawTransaction),
        Box::new(BlockNumber),
        Box::new(GasPrice),
        Box::new(MaxPriorityFeePerGas),
        Box::new(ChainId),
        Box::new(Balance),
        Box::new(TransactionCount),
        Box::new(BlockByHash),
        Box::new(BlockByNumber),
        Box::new(BlockReceipts),
        Box::new(TransactionByHash),
        Box::new(TransactionByBlockHashAndIndex),
        Box::new(TransactionByBlockNumberAndIndex),
        Box::new(TransactionReceipt),
        Box::new(TransactionCountByHash),
        Box::new(BlockTransactionCountByHash),
        Box::new(Code),
        Box::new(StorageAt),
        Box::new(NewFilter),
        Box::new(FilterLogs),
        Box::new(NewBlockFilter),
        Box::new(FilterChanges),
        Box::new(UninstallFilter),
        Box::new(Logs),
        Box::new(EstimateGas),
        Box::new(Call),
    ]
}

fn pretty<T: Serialize>(value: &T) -> Result<String, ProbeError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn warn_if(condition: bool, warning: &str) -> Vec<String> {
    if condition { vec![warning.to_string()] } else { Vec::new() }
}
