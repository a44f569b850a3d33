use alloy_rpc_types_eth::{Block, BlockNumberOrTag};
use async_trait::async_trait;
use ethprobe_types::{RpcMethod, RpcResult};

use super::pretty;
use crate::{context::TestContext, error::ProbeError, probe::Probe};

async fn head_block(ctx: &TestContext) -> Result<Block, ProbeError> {
    let number = ctx.client().block_number().await?;
    ctx.client()
        .block_by_number(BlockNumberOrTag::Number(number), false)
        .await?
        .ok_or_else(|| {
            ProbeError::invariant(format!("head block {number} is unknown to eth_getBlockByNumber"))
        })
}

/// Fetches the head by number, then the same block by its hash; both must be identical.
pub struct BlockByHash;

#[async_trait]
impl Probe for BlockByHash {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetBlockByHash
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let by_number = head_block(ctx).await?;
        let hash = by_number.header.hash;

        let by_hash = ctx
            .client()
            .block_by_hash(hash, false)
            .await?
            .ok_or_else(|| {
                ProbeError::invariant(format!("block {hash} is unknown to eth_getBlockByHash"))
            })?;

        if by_number != by_hash {
            return Err(ProbeError::invariant(
                "blockByNumber and blockByHash return different blocks",
            ));
        }

        Ok(RpcResult::ok(self.method(), pretty(&by_hash)?))
    }
}

pub struct BlockByNumber;

#[async_trait]
impl Probe for BlockByNumber {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetBlockByNumber
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let block = head_block(ctx).await?;
        Ok(RpcResult::ok(self.method(), pretty(&block)?))
    }
}

/// Receipts of the first block known to hold one of our transactions.
pub struct BlockReceipts;

#[async_trait]
impl Probe for BlockReceipts {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetBlockReceipts
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let number = ctx.first_block_with_tx()?;
        let receipts = ctx
            .client()
            .block_receipts(BlockNumberOrTag::Number(number))
            .await?
            .ok_or_else(|| {
                ProbeError::invariant(format!("no receipts for block {number}, which holds a transaction"))
            })?;

        Ok(RpcResult::ok(self.method(), pretty(&receipts)?))
    }
}
