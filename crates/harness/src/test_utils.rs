use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use ethprobe_execution::{EthClient, EthRpc};
use ethprobe_test_support::{FakeNode, fixtures};

use crate::{
    context::{Settings, TestContext},
    contract::TokenContract,
    tx::{FeeParams, TxIntent, make_signed_eip1559_tx, raw_bytes},
};

pub(crate) fn test_settings() -> Settings {
    Settings {
        mining_timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(500),
        filter_changes_wait: Duration::from_secs(3),
        balances_slot: fixtures::BALANCES_SLOT,
    }
}

pub(crate) fn context_for(node: FakeNode) -> TestContext {
    context_with(node, test_settings())
}

pub(crate) fn context_with(node: FakeNode, settings: Settings) -> TestContext {
    let token = TokenContract::from_hex(fixtures::TOKEN_BYTECODE).unwrap();
    TestContext::new(Arc::new(EthClient::new(node)), fixtures::funded_account(), token, settings)
}

/// Pushes a plain transfer into the node behind the harness's back.
pub(crate) async fn submit_transfer(node: &FakeNode) -> TxHash {
    let client = EthClient::new(node.clone());
    let account = fixtures::funded_account();
    let nonce =
        client.transaction_count(account.address(), BlockNumberOrTag::Pending).await.unwrap();

    let fees =
        FeeParams::from_suggestions(fixtures::CHAIN_ID, fixtures::GAS_PRICE, fixtures::PRIORITY_FEE);
    let intent = TxIntent {
        to: TxKind::Call(Address::repeat_byte(0x42)),
        value: U256::from(1),
        gas_limit: 21_000,
        input: Bytes::new(),
    };
    let envelope = make_signed_eip1559_tx(account.signer(), &fees, nonce, intent).await.unwrap();

    client.send_raw_transaction(raw_bytes(&envelope)).await.unwrap()
}
