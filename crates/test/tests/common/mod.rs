//! Shared helpers for the end-to-end suites.
//!
//! Every test owns its own fake node and context; nothing is shared between tests.

use std::{sync::Arc, time::Duration};

use ethprobe_execution::EthClient;
use ethprobe_harness::{Report, Runner, Settings, TestContext, TokenContract};
use ethprobe_test_support::{FakeNode, fixtures};
use ethprobe_types::{RpcMethod, RpcResult, Status};

pub(crate) const MINING_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn context(node: &FakeNode) -> TestContext {
    let token = TokenContract::from_hex(fixtures::TOKEN_BYTECODE).expect("fixture bytecode");
    TestContext::new(
        Arc::new(EthClient::new(node.clone())),
        fixtures::funded_account(),
        token,
        Settings::new(MINING_TIMEOUT),
    )
}

/// Runs the full sequence against `node` and returns the report with the context it left.
pub(crate) async fn run(node: &FakeNode) -> (Report, TestContext) {
    let mut ctx = context(node);
    let report = Runner::new().run(&mut ctx).await;
    (report, ctx)
}

#[allow(dead_code)]
pub(crate) fn verdict(report: &Report, method: RpcMethod) -> &RpcResult {
    report.get(method).unwrap_or_else(|| panic!("no verdict for {method}"))
}

#[allow(dead_code)]
pub(crate) fn assert_status(report: &Report, method: RpcMethod, status: Status) {
    let result = verdict(report, method);
    assert_eq!(result.status, status, "{method}: {result:?}");
}

#[allow(dead_code)]
pub(crate) fn assert_error(report: &Report, method: RpcMethod, message: &str) {
    let result = verdict(report, method);
    assert_eq!(result.status, Status::Error, "{method}: {result:?}");
    assert_eq!(result.error.as_deref(), Some(message), "{method}");
}
