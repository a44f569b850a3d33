use alloy_primitives::U256;
use alloy_rpc_types_eth::{BlockNumberOrTag, TransactionInput, TransactionRequest};
use async_trait::async_trait;
use ethprobe_types::{RpcMethod, RpcResult, constants::TOKEN_TRANSFER_AMOUNT};

use crate::{context::TestContext, error::ProbeError, probe::Probe};

/// Estimates a token transfer from the funded account to itself.
pub struct EstimateGas;

#[async_trait]
impl Probe for EstimateGas {
    fn method(&self) -> RpcMethod {
        RpcMethod::EstimateGas
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let contract = ctx.require_contract()?;
        let from = ctx.account().address();
        let input = ctx.token().transfer_calldata(from, U256::from(TOKEN_TRANSFER_AMOUNT));

        let request = TransactionRequest::default()
            .from(from)
            .to(contract)
            .input(TransactionInput::new(input));
        let gas = ctx.client().estimate_gas(&request).await?;

        Ok(RpcResult::ok(self.method(), gas.to_string()))
    }
}

/// Reads the funded account's token balance through `balanceOf`.
pub struct Call;

#[async_trait]
impl Probe for Call {
    fn method(&self) -> RpcMethod {
        RpcMethod::Call
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let contract = ctx.require_contract()?;
        let input = ctx.token().balance_of_calldata(ctx.account().address());

        let request =
            TransactionRequest::default().to(contract).input(TransactionInput::new(input));
        let output = ctx.client().call(&request, BlockNumberOrTag::Latest).await?;

        Ok(RpcResult::ok(self.method(), output.to_string()))
    }
}
