use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use alloy_primitives::{Address, B256, Bytes, U64, U128, U256};
use alloy_rpc_types_eth::{
    Block, BlockNumberOrTag, Filter, Log, Transaction, TransactionReceipt, TransactionRequest,
};
use async_trait::async_trait;
use color_eyre::eyre;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    config::ExecutionConfig,
    error::ExecutionError,
    eth_rpc::EthRpc,
    transport::{self, JsonRpcRequest, Transport},
};

/// JSON-RPC client for the node under test, generic over its transport.
pub struct EthClient {
    transport: Arc<dyn Transport>,
    next_id: AtomicU64,
}

impl EthClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_transport(Arc::new(transport))
    }

    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport, next_id: AtomicU64::new(1) }
    }

    /// Creates a client talking to the endpoint named in `config`.
    pub fn connect(config: &ExecutionConfig) -> eyre::Result<Self> {
        Ok(Self::from_transport(transport::connect(config)?))
    }

    async fn request<P, R>(&self, method: &str, params: P) -> eyre::Result<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let params = match serde_json::to_value(params)? {
            Value::Null => json!([]),
            params => params,
        };
        let req = JsonRpcRequest::new(method, params).with_id(id);
        debug!(id, method, params = %req.params, "rpc request");

        let resp = self.transport.send(&req).await?;

        if let Some(err) = resp.error {
            debug!(id, method, code = err.code, message = %err.message, "rpc error");
            return Err(ExecutionError::JsonRpc { code: err.code, message: err.message }.into());
        }

        let res = resp.result.unwrap_or(Value::Null);
        debug!(id, method, result = %res, "rpc response");

        serde_json::from_value(res).map_err(|e| {
            ExecutionError::InvalidResponse { method: method.to_string(), reason: e.to_string() }
                .into()
        })
    }
}

impl fmt::Debug for EthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthClient").field("transport", &"<dyn Transport>").finish()
    }
}

#[async_trait]
impl EthRpc for EthClient {
    async fn block_number(&self) -> eyre::Result<u64> {
        let number: U64 = self.request("eth_blockNumber", ()).await?;
        Ok(number.to())
    }

    async fn gas_price(&self) -> eyre::Result<u128> {
        let price: U128 = self.request("eth_gasPrice", ()).await?;
        Ok(price.to())
    }

    async fn max_priority_fee_per_gas(&self) -> eyre::Result<u128> {
        let fee: U128 = self.request("eth_maxPriorityFeePerGas", ()).await?;
        Ok(fee.to())
    }

    async fn chain_id(&self) -> eyre::Result<u64> {
        let chain_id: U64 = self.request("eth_chainId", ()).await?;
        Ok(chain_id.to())
    }

    async fn balance(&self, address: Address, block: BlockNumberOrTag) -> eyre::Result<U256> {
        self.request("eth_getBalance", (address, block)).await
    }

    async fn transaction_count(
        &self,
        address: Address,
        block: BlockNumberOrTag,
    ) -> eyre::Result<u64> {
        let nonce: U64 = self.request("eth_getTransactionCount", (address, block)).await?;
        Ok(nonce.to())
    }

    async fn block_by_number(
        &self,
        block: BlockNumberOrTag,
        full_transactions: bool,
    ) -> eyre::Result<Option<Block>> {
        self.request("eth_getBlockByNumber", (block, full_transactions)).await
    }

    async fn block_by_hash(
        &self,
        hash: B256,
        full_transactions: bool,
    ) -> eyre::Result<Option<Block>> {
        self.request("eth_getBlockByHash", (hash, full_transactions)).await
    }

    async fn block_receipts(
        &self,
        block: BlockNumberOrTag,
    ) -> eyre::Result<Option<Vec<TransactionReceipt>>> {
        self.request("eth_getBlockReceipts", (block,)).await
    }

    async fn transaction_by_hash(&self, hash: B256) -> eyre::Result<Option<Transaction>> {
        self.request("eth_getTransactionByHash", (hash,)).await
    }

    async fn transaction_by_block_hash_and_index(
        &self,
        block_hash: B256,
        index: u64,
    ) -> eyre::Result<Option<Transaction>> {
        self.request("eth_getTransactionByBlockHashAndIndex", (block_hash, U64::from(index))).await
    }

    async fn transaction_by_block_number_and_index(
        &self,
        block: BlockNumberOrTag,
        index: u64,
    ) -> eyre::Result<Option<Transaction>> {
        self.request("eth_getTransactionByBlockNumberAndIndex", (block, U64::from(index))).await
    }

    async fn transaction_receipt(&self, hash: B256) -> eyre::Result<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", (hash,)).await
    }

    async fn transaction_count_by_hash(&self, block_hash: B256) -> eyre::Result<u64> {
        let count: U64 = self.request("eth_getTransactionCountByHash", (block_hash,)).await?;
        Ok(count.to())
    }

    async fn block_transaction_count_by_hash(
        &self,
        block_hash: B256,
    ) -> eyre::Result<Option<u64>> {
        let count: Option<U64> =
            self.request("eth_getBlockTransactionCountByHash", (block_hash,)).await?;
        Ok(count.map(|c| c.to()))
    }

    async fn code(&self, address: Address, block: BlockNumberOrTag) -> eyre::Result<Bytes> {
        self.request("eth_getCode", (address, block)).await
    }

    async fn storage_at(
        &self,
        address: Address,
        key: B256,
        block: BlockNumberOrTag,
    ) -> eyre::Result<B256> {
        self.request("eth_getStorageAt", (address, key, block)).await
    }

    async fn new_filter(&self, filter: &Filter) -> eyre::Result<String> {
        self.request("eth_newFilter", (filter,)).await
    }

    async fn filter_logs(&self, filter_id: &str) -> eyre::Result<Vec<Log>> {
        self.request("eth_getFilterLogs", (filter_id,)).await
    }

    async fn new_block_filter(&self) -> eyre::Result<String> {
        self.request("eth_newBlockFilter", ()).await
    }

    async fn block_filter_changes(&self, filter_id: &str) -> eyre::Result<Vec<B256>> {
        self.request("eth_getFilterChanges", (filter_id,)).await
    }

    async fn uninstall_filter(&self, filter_id: &str) -> eyre::Result<bool> {
        self.request("eth_uninstallFilter", (filter_id,)).await
    }

    async fn logs(&self, filter: &Filter) -> eyre::Result<Vec<Log>> {
        self.request("eth_getLogs", (filter,)).await
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> eyre::Result<u64> {
        let gas: U64 = self.request("eth_estimateGas", (request,)).await?;
        Ok(gas.to())
    }

    async fn call(
        &self,
        request: &TransactionRequest,
        block: BlockNumberOrTag,
    ) -> eyre::Result<Bytes> {
        self.request("eth_call", (request, block)).await
    }

    async fn send_raw_transaction(&self, encoded: Bytes) -> eyre::Result<B256> {
        self.request("eth_sendRawTransaction", (encoded,)).await
    }

    async fn request_raw(&self, method: &str, params: Value) -> eyre::Result<Value> {
        self.request(method, params).await
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256};

    use super::*;
    use crate::transport::mock::{MockTransport, Reply};

    fn client(mock: &Arc<MockTransport>) -> EthClient {
        EthClient::from_transport(mock.clone())
    }

    #[tokio::test]
    async fn decodes_hex_quantities() {
        let mock = Arc::new(MockTransport::new());
        mock.push_result("eth_blockNumber", json!("0x1b4")).await;
        mock.push_result("eth_gasPrice", json!("0x3b9aca00")).await;
        mock.push_result("eth_chainId", json!("0x539")).await;

        let client = client(&mock);
        assert_eq!(client.block_number().await.unwrap(), 436);
        assert_eq!(client.gas_price().await.unwrap(), 1_000_000_000);
        assert_eq!(client.chain_id().await.unwrap(), 1337);

        let calls = mock.calls().await;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].params, json!([]));
        // Every request carries its own id.
        assert!(calls.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn sends_positional_params() {
        let mock = Arc::new(MockTransport::new());
        mock.push_result("eth_getBalance", json!("0xde0b6b3a7640000")).await;
        mock.push_result("eth_getTransactionByBlockNumberAndIndex", Value::Null).await;

        let client = client(&mock);
        let who = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let balance = client.balance(who, BlockNumberOrTag::Latest).await.unwrap();
        assert_eq!(balance, U256::from(1_000_000_000_000_000_000u128));

        let tx = client
            .transaction_by_block_number_and_index(BlockNumberOrTag::Number(5), 0)
            .await
            .unwrap();
        assert!(tx.is_none());

        let calls = mock.calls().await;
        assert_eq!(calls[0].params, json!([who, "latest"]));
        assert_eq!(calls[1].params, json!(["0x5", "0x0"]));
    }

    #[tokio::test]
    async fn null_receipt_is_none() {
        let mock = Arc::new(MockTransport::new());
        mock.push_result("eth_getTransactionReceipt", Value::Null).await;

        let hash = b256!("0x0101010101010101010101010101010101010101010101010101010101010101");
        assert!(client(&mock).transaction_receipt(hash).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn json_rpc_error_is_classified() {
        let mock = Arc::new(MockTransport::new());
        mock.push(
            "eth_sendRawTransaction",
            Reply::RpcError { code: -32000, message: "nonce too low".into() },
        )
        .await;

        let err =
            client(&mock).send_raw_transaction(Bytes::from_static(&[0x02])).await.unwrap_err();
        match err.downcast_ref::<ExecutionError>() {
            Some(ExecutionError::JsonRpc { code, message }) => {
                assert_eq!(*code, -32000);
                assert_eq!(message, "nonce too low");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_result_is_invalid_response() {
        let mock = Arc::new(MockTransport::new());
        mock.push_result("eth_uninstallFilter", json!("yes")).await;
        mock.push("eth_newBlockFilter", Reply::Transport("connection reset".into())).await;

        let client = client(&mock);
        let err = client.uninstall_filter("0x1").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExecutionError>(),
            Some(ExecutionError::InvalidResponse { method, .. }) if method == "eth_uninstallFilter"
        ));

        let err = client.new_block_filter().await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn raw_request_passes_params_through() {
        let mock = Arc::new(MockTransport::new());
        mock.push_result("eth_getTransactionCountByHash", json!("0x2")).await;

        let params = json!(["0xabc"]);
        let value = client(&mock)
            .request_raw("eth_getTransactionCountByHash", params.clone())
            .await
            .unwrap();
        assert_eq!(value, json!("0x2"));
        assert_eq!(mock.calls().await[0].params, params);
    }
}
