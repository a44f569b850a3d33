//! Lookups of transactions this run already saw mined. Always the first one recorded.

use alloy_rpc_types_eth::{Block, BlockNumberOrTag};
use async_trait::async_trait;
use ethprobe_types::{RpcMethod, RpcResult};

use super::pretty;
use crate::{context::TestContext, error::ProbeError, probe::Probe};

async fn first_block(ctx: &TestContext) -> Result<Block, ProbeError> {
    let number = ctx.first_block_with_tx()?;
    ctx.client()
        .block_by_number(BlockNumberOrTag::Number(number), false)
        .await?
        .ok_or_else(|| {
            ProbeError::invariant(format!("block {number} holding a mined transaction is unknown"))
        })
}

pub struct TransactionByHash;

#[async_trait]
impl Probe for TransactionByHash {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetTransactionByHash
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let hash = ctx.first_transaction()?;
        let tx = ctx
            .client()
            .transaction_by_hash(hash)
            .await?
            .ok_or_else(|| ProbeError::invariant(format!("mined transaction {hash} is unknown")))?;

        Ok(RpcResult::ok(self.method(), pretty(&tx)?))
    }
}

pub struct TransactionByBlockHashAndIndex;

#[async_trait]
impl Probe for TransactionByBlockHashAndIndex {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetTransactionByBlockHashAndIndex
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let block = first_block(ctx).await?;
        if block.transactions.is_empty() {
            return Err(ProbeError::missing("no transactions in the block"));
        }

        let hash = block.header.hash;
        let tx = ctx
            .client()
            .transaction_by_block_hash_and_index(hash, 0)
            .await?
            .ok_or_else(|| {
                ProbeError::invariant(format!("block {hash} has no transaction at index 0"))
            })?;

        Ok(RpcResult::ok(self.method(), pretty(&tx)?))
    }
}

pub struct TransactionByBlockNumberAndIndex;

#[async_trait]
impl Probe for TransactionByBlockNumberAndIndex {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetTransactionByBlockNumberAndIndex
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let number = ctx.first_block_with_tx()?;
        let tx = ctx
            .client()
            .transaction_by_block_number_and_index(BlockNumberOrTag::Number(number), 0)
            .await?
            .ok_or_else(|| {
                ProbeError::invariant(format!("block {number} has no transaction at index 0"))
            })?;

        Ok(RpcResult::ok(self.method(), pretty(&tx)?))
    }
}

/// Usually already proven by the confirmation poller.
pub struct TransactionReceipt;

#[async_trait]
impl Probe for TransactionReceipt {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetTransactionReceipt
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let hash = ctx.first_transaction()?;
        let receipt = ctx
            .client()
            .transaction_receipt(hash)
            .await?
            .ok_or_else(|| {
                ProbeError::invariant(format!("no receipt for mined transaction {hash}"))
            })?;

        Ok(RpcResult::ok(self.method(), pretty(&receipt)?))
    }
}

pub struct TransactionCountByHash;

#[async_trait]
impl Probe for TransactionCountByHash {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetTransactionCountByHash
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let block = first_block(ctx).await?;
        let count = ctx.client().transaction_count_by_hash(block.header.hash).await?;
        Ok(RpcResult::ok(self.method(), count.to_string()))
    }
}

pub struct BlockTransactionCountByHash;

#[async_trait]
impl Probe for BlockTransactionCountByHash {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetBlockTransactionCountByHash
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let block = first_block(ctx).await?;
        let hash = block.header.hash;
        let count = ctx
            .client()
            .block_transaction_count_by_hash(hash)
            .await?
            .ok_or_else(|| {
                ProbeError::invariant(format!("block {hash} is unknown to eth_getBlockTransactionCountByHash"))
            })?;

        Ok(RpcResult::ok(self.method(), count.to_string()))
    }
}
