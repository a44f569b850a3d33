//! Facts the sending probes need before they can build a transaction.
//!
//! Chain id and fee suggestions are fetched once per run. Nonce and balance change with every
//! transaction, so they are read fresh each time; only the first reading becomes a verdict.

use alloy_primitives::U256;
use alloy_rpc_types_eth::BlockNumberOrTag;
use ethprobe_types::RpcMethod;

use super::scalar::{Balance, ChainId, GasPrice, MaxPriorityFeePerGas, TransactionCount};
use crate::{
    context::TestContext,
    error::ProbeError,
    probe::{Probe, require},
};

async fn memoized<T: Send>(
    ctx: &mut TestContext,
    probe: &dyn Probe,
    read: fn(&TestContext) -> Option<T>,
) -> Result<T, ProbeError> {
    if let Some(value) = read(ctx) {
        return Ok(value);
    }

    require(probe, ctx).await?;
    read(ctx)
        .ok_or_else(|| ProbeError::missing(format!("{} did not yield a value", probe.method())))
}

pub(crate) async fn chain_id(ctx: &mut TestContext) -> Result<u64, ProbeError> {
    memoized(ctx, &ChainId, TestContext::chain_id).await
}

pub(crate) async fn gas_price(ctx: &mut TestContext) -> Result<u128, ProbeError> {
    memoized(ctx, &GasPrice, TestContext::gas_price).await
}

pub(crate) async fn max_priority_fee(ctx: &mut TestContext) -> Result<u128, ProbeError> {
    memoized(ctx, &MaxPriorityFeePerGas, TestContext::max_priority_fee).await
}

pub(crate) async fn nonce(ctx: &mut TestContext) -> Result<u64, ProbeError> {
    let address = ctx.account().address();
    let nonce = ctx.client().transaction_count(address, BlockNumberOrTag::Pending).await?;
    ctx.record_if_absent(RpcMethod::GetTransactionCount, || TransactionCount::verdict(nonce));
    Ok(nonce)
}

pub(crate) async fn balance(ctx: &mut TestContext) -> Result<U256, ProbeError> {
    let address = ctx.account().address();
    let balance = ctx.client().balance(address, BlockNumberOrTag::Latest).await?;
    ctx.record_if_absent(RpcMethod::GetBalance, || Balance::verdict(balance));
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use ethprobe_test_support::FakeNode;
    use ethprobe_types::Status;

    use super::*;
    use crate::test_utils::context_for;

    #[tokio::test]
    async fn chain_parameters_are_fetched_once_and_recorded() {
        let node = FakeNode::builder().build();
        let mut ctx = context_for(node.clone());

        let first = chain_id(&mut ctx).await.unwrap();
        let second = chain_id(&mut ctx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(node.calls("eth_chainId"), 1);
        assert!(ctx.already_tested(RpcMethod::ChainId).is_some());

        gas_price(&mut ctx).await.unwrap();
        gas_price(&mut ctx).await.unwrap();
        assert_eq!(node.calls("eth_gasPrice"), 1);
    }

    #[tokio::test]
    async fn nonce_is_read_fresh_but_recorded_once() {
        let node = FakeNode::builder().build();
        let mut ctx = context_for(node.clone());

        assert_eq!(nonce(&mut ctx).await.unwrap(), 0);
        assert_eq!(nonce(&mut ctx).await.unwrap(), 0);

        assert_eq!(node.calls("eth_getTransactionCount"), 2);
        let recorded: Vec<_> = ctx
            .completed()
            .iter()
            .filter(|result| result.method == RpcMethod::GetTransactionCount)
            .collect();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].status, Status::Warning);
    }

    #[tokio::test]
    async fn failed_prerequisite_is_not_retried() {
        let node = FakeNode::builder().fail_method("eth_chainId").build();
        let mut ctx = context_for(node.clone());

        assert!(matches!(chain_id(&mut ctx).await, Err(ProbeError::Rpc(_))));
        let err = chain_id(&mut ctx).await.unwrap_err();

        assert!(err.to_string().starts_with("eth_chainId failed earlier"));
        assert_eq!(node.calls("eth_chainId"), 1);
    }
}
