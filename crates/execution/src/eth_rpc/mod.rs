use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_rpc_types_eth::{
    Block, BlockNumberOrTag, Filter, Log, Transaction, TransactionReceipt, TransactionRequest,
};
use async_trait::async_trait;
use color_eyre::eyre;
use serde_json::Value;

/// A trait representing the standard Ethereum JSON-RPC API of the node under test.
///
/// Quantities are decoded into native integers; lookups the node may legitimately not answer
/// (unknown hash, pending receipt) return `None` instead of an error.
#[async_trait]
pub trait EthRpc: Send + Sync {
    /// `eth_blockNumber`
    async fn block_number(&self) -> eyre::Result<u64>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> eyre::Result<u128>;

    /// `eth_maxPriorityFeePerGas`
    async fn max_priority_fee_per_gas(&self) -> eyre::Result<u128>;

    /// `eth_chainId`
    async fn chain_id(&self) -> eyre::Result<u64>;

    /// `eth_getBalance`
    async fn balance(&self, address: Address, block: BlockNumberOrTag) -> eyre::Result<U256>;

    /// `eth_getTransactionCount`, i.e. the account nonce at `block`.
    async fn transaction_count(&self, address: Address, block: BlockNumberOrTag)
    -> eyre::Result<u64>;

    /// `eth_getBlockByNumber`
    async fn block_by_number(
        &self,
        block: BlockNumberOrTag,
        full_transactions: bool,
    ) -> eyre::Result<Option<Block>>;

    /// `eth_getBlockByHash`
    async fn block_by_hash(&self, hash: B256, full_transactions: bool)
    -> eyre::Result<Option<Block>>;

    /// `eth_getBlockReceipts`
    async fn block_receipts(
        &self,
        block: BlockNumberOrTag,
    ) -> eyre::Result<Option<Vec<TransactionReceipt>>>;

    /// `eth_getTransactionByHash`
    async fn transaction_by_hash(&self, hash: B256) -> eyre::Result<Option<Transaction>>;

    /// `eth_getTransactionByBlockHashAndIndex`
    async fn transaction_by_block_hash_and_index(
        &self,
        block_hash: B256,
        index: u64,
    ) -> eyre::Result<Option<Transaction>>;

    /// `eth_getTransactionByBlockNumberAndIndex`
    async fn transaction_by_block_number_and_index(
        &self,
        block: BlockNumberOrTag,
        index: u64,
    ) -> eyre::Result<Option<Transaction>>;

    /// `eth_getTransactionReceipt`
    async fn transaction_receipt(&self, hash: B256) -> eyre::Result<Option<TransactionReceipt>>;

    /// `eth_getTransactionCountByHash`, a non-standard alias some clients expose.
    async fn transaction_count_by_hash(&self, block_hash: B256) -> eyre::Result<u64>;

    /// `eth_getBlockTransactionCountByHash`
    async fn block_transaction_count_by_hash(&self, block_hash: B256) -> eyre::Result<Option<u64>>;

    /// `eth_getCode`
    async fn code(&self, address: Address, block: BlockNumberOrTag) -> eyre::Result<Bytes>;

    /// `eth_getStorageAt`
    async fn storage_at(
        &self,
        address: Address,
        key: B256,
        block: BlockNumberOrTag,
    ) -> eyre::Result<B256>;

    /// `eth_newFilter`, returning the node-assigned filter id.
    async fn new_filter(&self, filter: &Filter) -> eyre::Result<String>;

    /// `eth_getFilterLogs`
    async fn filter_logs(&self, filter_id: &str) -> eyre::Result<Vec<Log>>;

    /// `eth_newBlockFilter`
    async fn new_block_filter(&self) -> eyre::Result<String>;

    /// `eth_getFilterChanges` for a block filter: hashes of blocks seen since the last poll.
    async fn block_filter_changes(&self, filter_id: &str) -> eyre::Result<Vec<B256>>;

    /// `eth_uninstallFilter`
    async fn uninstall_filter(&self, filter_id: &str) -> eyre::Result<bool>;

    /// `eth_getLogs`
    async fn logs(&self, filter: &Filter) -> eyre::Result<Vec<Log>>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, request: &TransactionRequest) -> eyre::Result<u64>;

    /// `eth_call`
    async fn call(&self, request: &TransactionRequest, block: BlockNumberOrTag)
    -> eyre::Result<Bytes>;

    /// `eth_sendRawTransaction`, returning the hash the node assigned.
    async fn send_raw_transaction(&self, encoded: Bytes) -> eyre::Result<B256>;

    /// Issues an arbitrary method by name with positional parameters.
    async fn request_raw(&self, method: &str, params: Value) -> eyre::Result<Value>;
}
