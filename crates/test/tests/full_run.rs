//! The whole probe sequence against a well-behaved node.

mod common;

use common::{assert_status, run, verdict};
use ethprobe_test_support::FakeNode;
use ethprobe_types::{RpcMethod, Status};

#[tokio::test(start_paused = true)]
async fn healthy_node_passes_every_probe() {
    let node = FakeNode::builder().build();
    let (report, ctx) = run(&node).await;

    let methods: Vec<_> = report.results().iter().map(|result| result.method).collect();
    assert_eq!(methods, RpcMethod::ALL);
    assert!(!report.has_errors(), "{report:#?}");

    // Transfer, deploy, token transfer, then one token transfer each for the two log probes.
    assert_eq!(ctx.processed_transactions().len(), 5);
    assert_eq!(ctx.blocks_with_tx(), &[1, 2, 3, 4, 5]);
    assert_eq!(node.head(), 5);
    assert_eq!(node.calls("eth_sendRawTransaction"), 5);

    let send = verdict(&report, RpcMethod::SendRawTransaction);
    assert_eq!(send.value, ctx.processed_transactions()[0].to_string());

    // The first nonce reading of the run is zero.
    assert_status(&report, RpcMethod::GetTransactionCount, Status::Warning);
    // Nothing is mined while the harness sleeps before polling the block filter.
    assert_status(&report, RpcMethod::GetFilterChanges, Status::Warning);
    let changes = verdict(&report, RpcMethod::GetFilterChanges);
    assert_eq!(changes.warnings, vec!["no new blocks".to_string()]);

    for method in [
        RpcMethod::BlockNumber,
        RpcMethod::GetBlockByHash,
        RpcMethod::GetBlockReceipts,
        RpcMethod::GetTransactionByBlockHashAndIndex,
        RpcMethod::GetCode,
        RpcMethod::GetStorageAt,
        RpcMethod::GetFilterLogs,
        RpcMethod::UninstallFilter,
        RpcMethod::GetLogs,
        RpcMethod::Call,
    ] {
        assert_status(&report, method, Status::Ok);
    }
    assert_eq!(report.worst_status(), Some(Status::Warning));
}

#[tokio::test(start_paused = true)]
async fn chain_parameters_are_fetched_once_per_run() {
    let node = FakeNode::builder().build();
    run(&node).await;

    assert_eq!(node.calls("eth_chainId"), 1);
    assert_eq!(node.calls("eth_gasPrice"), 1);
    assert_eq!(node.calls("eth_maxPriorityFeePerGas"), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_gas_price_is_reported_but_sending_still_works() {
    let node = FakeNode::builder().gas_price(0).build();
    let (report, _) = run(&node).await;

    let gas_price = verdict(&report, RpcMethod::GasPrice);
    assert_eq!(gas_price.status, Status::Warning);
    assert_eq!(gas_price.value, "0");
    assert_eq!(gas_price.warnings, vec!["gasPrice is zero".to_string()]);

    assert_status(&report, RpcMethod::SendRawTransaction, Status::Ok);
    assert!(!report.has_errors());
}

#[tokio::test(start_paused = true)]
async fn report_serializes_as_an_ordered_list() {
    let node = FakeNode::builder().build();
    let (report, _) = run(&node).await;

    let json = serde_json::to_value(&report).unwrap();
    let entries = json.as_array().unwrap();

    assert_eq!(entries.len(), 26);
    assert_eq!(entries[0]["method"], "eth_sendRawTransaction");
    assert_eq!(entries[0]["status"], "ok");
    assert_eq!(entries[25]["method"], "eth_call");
    assert!(entries[0].get("error").is_none());
}
