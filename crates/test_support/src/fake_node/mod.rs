//! An Ethereum node simulated in memory, reachable through the `Transport` seam.
//!
//! The fake decodes raw EIP-1559 transactions, mines exactly one block per accepted
//! transaction, tracks the funded account's balance and nonce, understands the two token
//! calls the harness makes (`transfer`, `balanceOf`) and keeps log and block filters.
//! Failure knobs on [`FakeNodeBuilder`] turn it into a misbehaving node.

mod chain;
mod render;

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use alloy_primitives::U256;
use async_trait::async_trait;
use color_eyre::eyre;
use ethprobe_execution::transport::{JsonRpcRequest, JsonRpcResponse, Transport};

use self::chain::Chain;
use crate::fixtures;

/// Behaviour switches of a [`FakeNode`].
#[derive(Clone, Debug)]
pub(crate) struct Knobs {
    pub(crate) gas_price: u128,
    pub(crate) funded_balance: U256,
    pub(crate) reject_sends: bool,
    pub(crate) never_mine: bool,
    pub(crate) diverging_block_by_hash: bool,
    pub(crate) frozen_balance: bool,
    pub(crate) uninstall_always_true: bool,
    pub(crate) uninstall_always_false: bool,
    pub(crate) revert_deployments: bool,
    pub(crate) omit_contract_address: bool,
    pub(crate) receipts_without_block: bool,
    pub(crate) failing: HashSet<String>,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            gas_price: fixtures::GAS_PRICE,
            funded_balance: fixtures::funded_balance(),
            reject_sends: false,
            never_mine: false,
            diverging_block_by_hash: false,
            frozen_balance: false,
            uninstall_always_true: false,
            uninstall_always_false: false,
            revert_deployments: false,
            omit_contract_address: false,
            receipts_without_block: false,
            failing: HashSet::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeNodeBuilder {
    knobs: Knobs,
}

impl FakeNodeBuilder {
    pub fn gas_price(mut self, wei: u128) -> Self {
        self.knobs.gas_price = wei;
        self
    }

    /// Starting balance of the funded account.
    pub fn funded_balance(mut self, wei: U256) -> Self {
        self.knobs.funded_balance = wei;
        self
    }

    /// Every `eth_sendRawTransaction` fails with a JSON-RPC error.
    pub fn reject_sends(mut self) -> Self {
        self.knobs.reject_sends = true;
        self
    }

    /// Accepts transactions but never includes them.
    pub fn never_mine(mut self) -> Self {
        self.knobs.never_mine = true;
        self
    }

    /// `eth_getBlockByHash` answers with a block whose extra data differs from the one
    /// `eth_getBlockByNumber` returns.
    pub fn diverging_block_by_hash(mut self) -> Self {
        self.knobs.diverging_block_by_hash = true;
        self
    }

    /// Transfers never debit the sender.
    pub fn frozen_balance(mut self) -> Self {
        self.knobs.frozen_balance = true;
        self
    }

    /// `eth_uninstallFilter` reports success even for unknown ids.
    pub fn uninstall_always_true(mut self) -> Self {
        self.knobs.uninstall_always_true = true;
        self
    }

    /// `eth_uninstallFilter` reports failure even for live filters, which stay installed.
    pub fn uninstall_always_false(mut self) -> Self {
        self.knobs.uninstall_always_false = true;
        self
    }

    /// Contract creations are mined with a failed status and no contract.
    pub fn revert_deployments(mut self) -> Self {
        self.knobs.revert_deployments = true;
        self
    }

    /// Contract creations succeed, but receipts leave `contractAddress` null.
    pub fn omit_contract_address(mut self) -> Self {
        self.knobs.omit_contract_address = true;
        self
    }

    /// Receipts come back with a null `blockHash` and `blockNumber`.
    pub fn receipts_without_block(mut self) -> Self {
        self.knobs.receipts_without_block = true;
        self
    }

    /// `method` always answers with a JSON-RPC internal error.
    pub fn fail_method(mut self, method: &str) -> Self {
        self.knobs.failing.insert(method.to_string());
        self
    }

    pub fn build(self) -> FakeNode {
        FakeNode { chain: Arc::new(Mutex::new(Chain::new(self.knobs))) }
    }
}

/// Cheap to clone; clones share one chain, so a test can keep a handle for assertions after
/// moving another into the client.
#[derive(Clone, Debug)]
pub struct FakeNode {
    chain: Arc<Mutex<Chain>>,
}

impl FakeNode {
    pub fn builder() -> FakeNodeBuilder {
        FakeNodeBuilder::default()
    }

    /// How many requests for `method` reached the node.
    pub fn calls(&self, method: &str) -> usize {
        self.chain.lock().unwrap().calls.iter().filter(|called| *called == method).count()
    }

    /// Every request method in arrival order.
    pub fn call_log(&self) -> Vec<String> {
        self.chain.lock().unwrap().calls.clone()
    }

    pub fn head(&self) -> u64 {
        self.chain.lock().unwrap().head()
    }
}

#[async_trait]
impl Transport for FakeNode {
    async fn send(&self, req: &JsonRpcRequest) -> eyre::Result<JsonRpcResponse> {
        let mut chain = self.chain.lock().unwrap();
        chain.calls.push(req.method.clone());

        if chain.knobs.failing.contains(&req.method) {
            return Ok(JsonRpcResponse::failure(req.id, -32603, "internal error"));
        }

        Ok(match chain.handle(&req.method, &req.params) {
            Ok(result) => JsonRpcResponse::success(req.id, result),
            Err(fault) => JsonRpcResponse::failure(req.id, fault.code, fault.message),
        })
    }
}
