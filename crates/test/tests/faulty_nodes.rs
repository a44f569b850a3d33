//! Runs against nodes that misbehave in one specific way. A failing probe must not stop the
//! run, and every probe that depends on it must say what it was missing.

mod common;

use alloy_primitives::U256;
use common::{MINING_TIMEOUT, assert_error, assert_status, run, verdict};
use ethprobe_test_support::FakeNode;
use ethprobe_types::{RpcMethod, Status};
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn rejected_sends_leave_history_probes_without_input() {
    let node = FakeNode::builder().reject_sends().build();
    let (report, ctx) = run(&node).await;

    assert_eq!(report.results().len(), 26);
    assert!(ctx.processed_transactions().is_empty());

    let send = verdict(&report, RpcMethod::SendRawTransaction);
    assert_eq!(send.status, Status::Error);
    assert!(send.error.as_deref().unwrap().contains("transaction rejected"));

    // Scalars do not depend on a mined transaction.
    assert_status(&report, RpcMethod::BlockNumber, Status::Warning);
    assert_status(&report, RpcMethod::ChainId, Status::Ok);
    assert_status(&report, RpcMethod::GetBalance, Status::Ok);
    assert_status(&report, RpcMethod::GetBlockByHash, Status::Ok);
    assert_status(&report, RpcMethod::NewBlockFilter, Status::Ok);

    assert_error(&report, RpcMethod::GetTransactionByHash, "no transactions");
    assert_error(&report, RpcMethod::GetTransactionReceipt, "no transactions");
    assert_error(&report, RpcMethod::GetBlockReceipts, "no blocks with transactions");
    assert_error(&report, RpcMethod::GetBlockTransactionCountByHash, "no blocks with transactions");
    assert_error(&report, RpcMethod::GetCode, "no contract address, must be deployed first");
    assert_error(&report, RpcMethod::Call, "no contract address, must be deployed first");
    assert_error(&report, RpcMethod::UninstallFilter, "no filter id, must create a filter first");
    assert_error(&report, RpcMethod::GetLogs, "failed to create a filter");
}

#[tokio::test(start_paused = true)]
async fn diverging_block_lookups_are_flagged() {
    let node = FakeNode::builder().diverging_block_by_hash().build();
    let (report, _) = run(&node).await;

    assert_error(
        &report,
        RpcMethod::GetBlockByHash,
        "implementation error: blockByNumber and blockByHash return different blocks",
    );
    assert_status(&report, RpcMethod::GetBlockByNumber, Status::Ok);
    assert_eq!(report.counts().2, 1);
}

#[tokio::test(start_paused = true)]
async fn balance_that_never_moves_fails_the_send() {
    let node = FakeNode::builder().frozen_balance().build();
    let (report, ctx) = run(&node).await;

    let send = verdict(&report, RpcMethod::SendRawTransaction);
    assert_eq!(send.status, Status::Error);
    assert!(send.error.as_deref().unwrap().contains("balance did not decrease"));

    // The transfer itself was mined, so history probes still have input.
    assert_eq!(ctx.processed_transactions().len(), 1);
    assert_status(&report, RpcMethod::GetTransactionByHash, Status::Ok);
    assert_error(&report, RpcMethod::GetCode, "no contract address, must be deployed first");
}

#[tokio::test(start_paused = true)]
async fn idempotent_uninstall_is_an_implementation_error() {
    let node = FakeNode::builder().uninstall_always_true().build();
    let (report, _) = run(&node).await;

    assert_error(
        &report,
        RpcMethod::UninstallFilter,
        "implementation error: uninstall filter should have failed because it was already uninstalled",
    );
    // eth_getLogs reuses the query, which outlives the filter id.
    assert_status(&report, RpcMethod::GetLogs, Status::Ok);
}

#[tokio::test(start_paused = true)]
async fn unmined_transaction_times_out_after_the_configured_wait() {
    let node = FakeNode::builder().never_mine().build();
    let start = Instant::now();
    let (report, ctx) = run(&node).await;

    let send = verdict(&report, RpcMethod::SendRawTransaction);
    assert_eq!(send.status, Status::Error);
    let error = send.error.as_deref().unwrap();
    assert!(error.starts_with("timeout exceeded while waiting for transaction"), "{error}");

    assert!(ctx.processed_transactions().is_empty());
    assert!(start.elapsed() >= MINING_TIMEOUT);
    assert_error(&report, RpcMethod::GetTransactionByHash, "no transactions");
}

#[tokio::test(start_paused = true)]
async fn failing_receipt_lookups_surface_as_send_errors() {
    let node = FakeNode::builder().fail_method("eth_getTransactionReceipt").build();
    let (report, _) = run(&node).await;

    let send = verdict(&report, RpcMethod::SendRawTransaction);
    assert_eq!(send.status, Status::Error);
    assert!(send.error.as_deref().unwrap().contains("internal error"));
    // The poller gave up after the first failed lookup.
    assert_eq!(node.calls("eth_getTransactionReceipt"), 1);
}

#[tokio::test(start_paused = true)]
async fn unfunded_account_cannot_send() {
    let node = FakeNode::builder().funded_balance(U256::ZERO).build();
    let (report, ctx) = run(&node).await;

    assert_error(&report, RpcMethod::SendRawTransaction, "insufficient balance before send: 0 wei");
    let balance = verdict(&report, RpcMethod::GetBalance);
    assert_eq!(balance.status, Status::Warning);
    assert_eq!(balance.warnings, vec!["balance is zero".to_string()]);

    assert_eq!(node.calls("eth_sendRawTransaction"), 0);
    assert!(ctx.processed_transactions().is_empty());
    assert_error(&report, RpcMethod::GetTransactionReceipt, "no transactions");
}
