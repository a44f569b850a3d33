use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Ethereum JSON-RPC methods exercised by the harness.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RpcMethod {
    SendRawTransaction,
    BlockNumber,
    GasPrice,
    MaxPriorityFeePerGas,
    ChainId,
    GetBalance,
    GetTransactionCount,
    GetBlockByHash,
    GetBlockByNumber,
    GetBlockReceipts,
    GetTransactionByHash,
    GetTransactionByBlockHashAndIndex,
    GetTransactionByBlockNumberAndIndex,
    GetTransactionReceipt,
    GetTransactionCountByHash,
    GetBlockTransactionCountByHash,
    GetCode,
    GetStorageAt,
    NewFilter,
    GetFilterLogs,
    NewBlockFilter,
    GetFilterChanges,
    UninstallFilter,
    GetLogs,
    EstimateGas,
    Call,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 26] = [
        Self::SendRawTransaction,
        Self::BlockNumber,
        Self::GasPrice,
        Self::MaxPriorityFeePerGas,
        Self::ChainId,
        Self::GetBalance,
        Self::GetTransactionCount,
        Self::GetBlockByHash,
        Self::GetBlockByNumber,
        Self::GetBlockReceipts,
        Self::GetTransactionByHash,
        Self::GetTransactionByBlockHashAndIndex,
        Self::GetTransactionByBlockNumberAndIndex,
        Self::GetTransactionReceipt,
        Self::GetTransactionCountByHash,
        Self::GetBlockTransactionCountByHash,
        Self::GetCode,
        Self::GetStorageAt,
        Self::NewFilter,
        Self::GetFilterLogs,
        Self::NewBlockFilter,
        Self::GetFilterChanges,
        Self::UninstallFilter,
        Self::GetLogs,
        Self::EstimateGas,
        Self::Call,
    ];

    /// The wire name of the method, e.g. `eth_chainId`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SendRawTransaction => "eth_sendRawTransaction",
            Self::BlockNumber => "eth_blockNumber",
            Self::GasPrice => "eth_gasPrice",
            Self::MaxPriorityFeePerGas => "eth_maxPriorityFeePerGas",
            Self::ChainId => "eth_chainId",
            Self::GetBalance => "eth_getBalance",
            Self::GetTransactionCount => "eth_getTransactionCount",
            Self::GetBlockByHash => "eth_getBlockByHash",
            Self::GetBlockByNumber => "eth_getBlockByNumber",
            Self::GetBlockReceipts => "eth_getBlockReceipts",
            Self::GetTransactionByHash => "eth_getTransactionByHash",
            Self::GetTransactionByBlockHashAndIndex => "eth_getTransactionByBlockHashAndIndex",
            Self::GetTransactionByBlockNumberAndIndex => "eth_getTransactionByBlockNumberAndIndex",
            Self::GetTransactionReceipt => "eth_getTransactionReceipt",
            Self::GetTransactionCountByHash => "eth_getTransactionCountByHash",
            Self::GetBlockTransactionCountByHash => "eth_getBlockTransactionCountByHash",
            Self::GetCode => "eth_getCode",
            Self::GetStorageAt => "eth_getStorageAt",
            Self::NewFilter => "eth_newFilter",
            Self::GetFilterLogs => "eth_getFilterLogs",
            Self::NewBlockFilter => "eth_newBlockFilter",
            Self::GetFilterChanges => "eth_getFilterChanges",
            Self::UninstallFilter => "eth_uninstallFilter",
            Self::GetLogs => "eth_getLogs",
            Self::EstimateGas => "eth_estimateGas",
            Self::Call => "eth_call",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown RPC method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for RpcMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

impl Serialize for RpcMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RpcMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
