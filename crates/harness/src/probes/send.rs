use alloy_primitives::{Bytes, TxHash, TxKind, U256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use async_trait::async_trait;
use ethprobe_types::{
    Account, RpcMethod, RpcResult,
    constants::{CONTRACT_GAS_LIMIT, TOKEN_TRANSFER_AMOUNT, TRANSFER_GAS_LIMIT, TRANSFER_VALUE_WEI},
};
use tracing::info;

use super::prereq;
use crate::{
    context::TestContext,
    error::ProbeError,
    poller::ConfirmationPoller,
    probe::Probe,
    tx::{FeeParams, TxIntent, make_signed_eip1559_tx, raw_bytes},
};

/// Plain value transfer, then token deployment, then a token transfer.
///
/// The verdict value is the hash of the value transfer.
pub struct SendRawTransaction;

#[async_trait]
impl Probe for SendRawTransaction {
    fn method(&self) -> RpcMethod {
        RpcMethod::SendRawTransaction
    }

    async fn execute(&self, ctx: &mut TestContext) -> Result<RpcResult, ProbeError> {
        let transfer = transfer_value(ctx).await?;
        deploy_token(ctx).await?;
        transfer_token(ctx).await?;

        Ok(RpcResult::ok(self.method(), transfer.to_string()))
    }
}

/// Signs, submits and waits for one transaction from the funded account.
async fn submit(ctx: &mut TestContext, intent: TxIntent) -> Result<TxHash, ProbeError> {
    let chain_id = prereq::chain_id(ctx).await?;
    let nonce = prereq::nonce(ctx).await?;
    let priority_fee = prereq::max_priority_fee(ctx).await?;
    let gas_price = prereq::gas_price(ctx).await?;
    let fees = FeeParams::from_suggestions(chain_id, gas_price, priority_fee);

    let envelope = make_signed_eip1559_tx(ctx.account().signer(), &fees, nonce, intent).await?;
    let tx_hash = *envelope.tx_hash();

    let returned = ctx.client().send_raw_transaction(raw_bytes(&envelope)).await?;
    if returned != tx_hash {
        return Err(ProbeError::invariant(format!(
            "eth_sendRawTransaction returned hash {returned}, expected {tx_hash}"
        )));
    }
    info!(%tx_hash, nonce, max_fee = fees.max_fee_per_gas, "Transaction submitted");

    let poller = ConfirmationPoller::from_context(ctx);
    poller.wait(ctx, tx_hash).await?.into_result(tx_hash, poller.timeout())?;
    Ok(tx_hash)
}

/// Moves 1 wei to a throwaway account and checks the sender paid at least that much.
async fn transfer_value(ctx: &mut TestContext) -> Result<TxHash, ProbeError> {
    let value = U256::from(TRANSFER_VALUE_WEI);
    let recipient = Account::random().address();

    let before = prereq::balance(ctx).await?;
    if before < value {
        return Err(ProbeError::missing(format!("insufficient balance before send: {before} wei")));
    }

    let intent = TxIntent {
        to: TxKind::Call(recipient),
        value,
        gas_limit: TRANSFER_GAS_LIMIT,
        input: Bytes::new(),
    };
    let tx_hash = submit(ctx, intent).await?;

    let address = ctx.account().address();
    let after = ctx.client().balance(address, BlockNumberOrTag::Latest).await?;
    // Gas is paid on top, so this is a lower bound only.
    if before.saturating_sub(after) < value {
        return Err(ProbeError::invariant(format!(
            "balance did not decrease by at least {value} wei after {tx_hash} (before {before}, after {after})"
        )));
    }

    Ok(tx_hash)
}

async fn deploy_token(ctx: &mut TestContext) -> Result<TxHash, ProbeError> {
    let intent = TxIntent {
        to: TxKind::Create,
        value: U256::ZERO,
        gas_limit: CONTRACT_GAS_LIMIT,
        input: ctx.token().bytecode().clone(),
    };
    let tx_hash = submit(ctx, intent).await?;

    if ctx.contract_address().is_zero() {
        return Err(ProbeError::invariant("contract address is empty, failed to deploy"));
    }
    info!(contract = %ctx.contract_address(), %tx_hash, "Token deployed");

    Ok(tx_hash)
}

/// Sends one token unit to a throwaway account, producing a `Transfer` log.
///
/// Not memoized: the log probes call it to guarantee fresh log activity.
pub(crate) async fn transfer_token(ctx: &mut TestContext) -> Result<TxHash, ProbeError> {
    let contract = ctx.require_contract()?;
    let recipient = Account::random().address();
    let input = ctx.token().transfer_calldata(recipient, U256::from(TOKEN_TRANSFER_AMOUNT));

    let intent = TxIntent {
        to: TxKind::Call(contract),
        value: U256::ZERO,
        gas_limit: CONTRACT_GAS_LIMIT,
        input,
    };
    submit(ctx, intent).await
}
