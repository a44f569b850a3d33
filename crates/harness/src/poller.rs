use std::time::Duration;

use alloy_primitives::TxHash;
use alloy_rpc_types_eth::TransactionReceipt;
use ethprobe_types::{RpcMethod, RpcResult};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::{context::TestContext, error::ProbeError};

/// How a wait for inclusion ended.
#[derive(Debug)]
pub enum Confirmation {
    Mined(Box<TransactionReceipt>),
    /// Included, but the receipt status bit is zero.
    Reverted(Box<TransactionReceipt>),
    TimedOut,
}

impl Confirmation {
    /// Maps anything but a successful inclusion to the matching probe failure.
    pub fn into_result(
        self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<Box<TransactionReceipt>, ProbeError> {
        match self {
            Self::Mined(receipt) => Ok(receipt),
            Self::Reverted(_) => Err(ProbeError::TransactionFailed(tx_hash)),
            Self::TimedOut => Err(ProbeError::Timeout { tx_hash, timeout }),
        }
    }
}

/// Waits for a submitted transaction to be mined, asking for its receipt on a fixed cadence
/// until it shows up or the deadline passes.
#[derive(Copy, Clone, Debug)]
pub struct ConfirmationPoller {
    interval: Duration,
    timeout: Duration,
}

impl ConfirmationPoller {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn from_context(ctx: &TestContext) -> Self {
        let settings = ctx.settings();
        Self::new(settings.poll_interval, settings.mining_timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Blocks until `tx_hash` resolves.
    ///
    /// A missing receipt, or one without a block number, means "not mined yet"; any other node
    /// error aborts the wait. On
    /// inclusion the hash and block are appended to the context, the receipt is recorded as the
    /// `eth_getTransactionReceipt` verdict if none exists yet, and a created contract address is
    /// captured.
    pub async fn wait(
        &self,
        ctx: &mut TestContext,
        tx_hash: TxHash,
    ) -> Result<Confirmation, ProbeError> {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut next_poll = start + self.interval;

        loop {
            sleep_until(next_poll.min(deadline)).await;
            if Instant::now() >= deadline {
                info!(%tx_hash, timeout = ?self.timeout, "Gave up waiting for transaction");
                return Ok(Confirmation::TimedOut);
            }

            match ctx.client().transaction_receipt(tx_hash).await? {
                Some(receipt) if receipt.block_number.is_some() => {
                    return Self::on_receipt(ctx, tx_hash, receipt);
                }
                Some(_) => debug!(%tx_hash, "Receipt has no block number yet"),
                None => debug!(%tx_hash, elapsed = ?start.elapsed(), "Transaction not mined yet"),
            }

            next_poll += self.interval;
        }
    }

    fn on_receipt(
        ctx: &mut TestContext,
        tx_hash: TxHash,
        receipt: TransactionReceipt,
    ) -> Result<Confirmation, ProbeError> {
        let block_number = receipt
            .block_number
            .ok_or_else(|| ProbeError::invariant(format!("receipt of {tx_hash} has no block")))?;
        ctx.record_confirmed(tx_hash, block_number);

        let rendered = serde_json::to_string_pretty(&receipt)?;
        ctx.record_if_absent(RpcMethod::GetTransactionReceipt, || {
            RpcResult::ok(RpcMethod::GetTransactionReceipt, rendered)
        });

        if let Some(address) = receipt.contract_address {
            ctx.set_contract_address(address);
        }

        let success = receipt.status();
        info!(%tx_hash, block_number, success, "Transaction mined");

        Ok(if success {
            Confirmation::Mined(Box::new(receipt))
        } else {
            Confirmation::Reverted(Box::new(receipt))
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use ethprobe_test_support::FakeNode;
    use ethprobe_types::Status;

    use super::*;
    use crate::test_utils::{context_for, submit_transfer};

    #[tokio::test(start_paused = true)]
    async fn times_out_within_one_interval_of_the_deadline() {
        let node = FakeNode::builder().never_mine().build();
        let mut ctx = context_for(node.clone());
        let tx_hash = submit_transfer(&node).await;

        let poller = ConfirmationPoller::new(Duration::from_millis(500), Duration::from_secs(2));
        let start = Instant::now();
        let outcome = poller.wait(&mut ctx, tx_hash).await.unwrap();
        let elapsed = start.elapsed();

        assert!(matches!(outcome, Confirmation::TimedOut));
        assert!(elapsed >= Duration::from_secs(2), "resolved too early: {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(2500), "resolved too late: {elapsed:?}");
        assert!(ctx.processed_transactions().is_empty());
        // Polled at 0.5s, 1.0s and 1.5s.
        assert_eq!(node.calls("eth_getTransactionReceipt"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn records_inclusion_facts() {
        let node = FakeNode::builder().build();
        let mut ctx = context_for(node.clone());
        let tx_hash = submit_transfer(&node).await;

        let poller = ConfirmationPoller::new(Duration::from_millis(500), Duration::from_secs(2));
        let outcome = poller.wait(&mut ctx, tx_hash).await.unwrap();

        let receipt = outcome.into_result(tx_hash, poller.timeout()).unwrap();
        assert_eq!(receipt.transaction_hash, tx_hash);
        assert_eq!(ctx.processed_transactions(), &[tx_hash]);
        assert_eq!(ctx.blocks_with_tx(), &[1]);
        assert_eq!(ctx.contract_address(), Address::ZERO);

        let cached = ctx.already_tested(RpcMethod::GetTransactionReceipt).unwrap();
        assert_eq!(cached.status, Status::Ok);
        assert!(cached.value.contains("transactionHash"));
    }

    #[tokio::test(start_paused = true)]
    async fn node_errors_abort_the_wait() {
        let node = FakeNode::builder().fail_method("eth_getTransactionReceipt").build();
        let mut ctx = context_for(node.clone());
        let tx_hash = submit_transfer(&node).await;

        let poller = ConfirmationPoller::new(Duration::from_millis(500), Duration::from_secs(2));
        let err = poller.wait(&mut ctx, tx_hash).await.unwrap_err();

        assert!(matches!(err, ProbeError::Rpc(_)));
        assert_eq!(node.calls("eth_getTransactionReceipt"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn receipt_without_block_number_is_still_pending() {
        let node = FakeNode::builder().receipts_without_block().build();
        let mut ctx = context_for(node.clone());
        let tx_hash = submit_transfer(&node).await;

        let poller = ConfirmationPoller::new(Duration::from_millis(500), Duration::from_secs(2));
        let outcome = poller.wait(&mut ctx, tx_hash).await.unwrap();

        assert!(matches!(outcome, Confirmation::TimedOut));
        assert!(ctx.processed_transactions().is_empty());
        assert!(ctx.blocks_with_tx().is_empty());
        assert!(ctx.already_tested(RpcMethod::GetTransactionReceipt).is_none());
        assert_eq!(node.calls("eth_getTransactionReceipt"), 3);
    }

    #[test]
    fn timed_out_maps_to_timeout_error() {
        let hash = TxHash::repeat_byte(9);
        let timeout = Duration::from_secs(1);

        assert!(matches!(
            Confirmation::TimedOut.into_result(hash, timeout),
            Err(ProbeError::Timeout { tx_hash, .. }) if tx_hash == hash
        ));
    }
}
