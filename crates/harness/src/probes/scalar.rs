use std::fmt::Display;

use alloy_primitives::U256;
use alloy_rpc_types_eth::BlockNumberOrTag;
use async_trait::async_trait;
use ethprobe_types::{RpcMethod, RpcResult};

use crate::{context::TestContext, error::ProbeError, probe::Probe};

/// Zero is legal for every scalar here but rarely what a healthy node reports.
fn scalar_verdict(method: RpcMethod, value: impl Display, is_zero: bool, name: &str) -> RpcResult {
    let warnings = super::warn_if(is_zero, &format!("{name} is zero"));
    RpcResult::with_warnings(method, value.to_string(), warnings)
}

pub struct BlockNumber;

#[async_trait]
impl Probe for BlockNumber {
    fn method(&self) -> RpcMethod {
        RpcMethod::BlockNumber
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let number = ctx.client().block_number().await?;
        Ok(scalar_verdict(self.method(), number, number == 0, "blockNumber"))
    }
}

pub struct GasPrice;

#[async_trait]
impl Probe for GasPrice {
    fn method(&self) -> RpcMethod {
        RpcMethod::GasPrice
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let price = ctx.client().gas_price().await?;
        ctx.cache_gas_price(price);
        Ok(scalar_verdict(self.method(), price, price == 0, "gasPrice"))
    }
}

pub struct MaxPriorityFeePerGas;

#[async_trait]
impl Probe for MaxPriorityFeePerGas {
    fn method(&self) -> RpcMethod {
        RpcMethod::MaxPriorityFeePerGas
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let fee = ctx.client().max_priority_fee_per_gas().await?;
        ctx.cache_max_priority_fee(fee);
        Ok(scalar_verdict(self.method(), fee, fee == 0, "maxPriorityFeePerGas"))
    }
}

pub struct ChainId;

#[async_trait]
impl Probe for ChainId {
    fn method(&self) -> RpcMethod {
        RpcMethod::ChainId
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let chain_id = ctx.client().chain_id().await?;
        ctx.cache_chain_id(chain_id);
        Ok(scalar_verdict(self.method(), chain_id, chain_id == 0, "chainId"))
    }
}

/// Balance of the funded account at the latest block.
pub struct Balance;

impl Balance {
    pub(crate) fn verdict(balance: U256) -> RpcResult {
        scalar_verdict(RpcMethod::GetBalance, balance, balance.is_zero(), "balance")
    }
}

#[async_trait]
impl Probe for Balance {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetBalance
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let address = ctx.account().address();
        let balance = ctx.client().balance(address, BlockNumberOrTag::Latest).await?;
        Ok(Self::verdict(balance))
    }
}

/// Pending nonce of the funded account.
pub struct TransactionCount;

impl TransactionCount {
    pub(crate) fn verdict(nonce: u64) -> RpcResult {
        scalar_verdict(RpcMethod::GetTransactionCount, nonce, nonce == 0, "nonce")
    }
}

#[async_trait]
impl Probe for TransactionCount {
    fn method(&self) -> RpcMethod {
        RpcMethod::GetTransactionCount
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let address = ctx.account().address();
        let nonce = ctx.client().transaction_count(address, BlockNumberOrTag::Pending).await?;
        Ok(Self::verdict(nonce))
    }
}
