use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, TxHash};
use alloy_rpc_types_eth::Filter;
use ethprobe_execution::EthRpc;
use ethprobe_types::{
    Account, RpcMethod, RpcResult,
    constants::{DEFAULT_BALANCES_SLOT, DEFAULT_FILTER_CHANGES_WAIT, DEFAULT_POLL_INTERVAL},
};
use tracing::{debug, warn};

use crate::{contract::TokenContract, error::ProbeError};

/// Timing and layout knobs of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// How long a submitted transaction may take to be mined.
    pub mining_timeout: Duration,
    pub poll_interval: Duration,
    /// Sleep before reading block filter changes, so the node has time to produce a block.
    pub filter_changes_wait: Duration,
    /// Slot of the token's balances mapping, for `eth_getStorageAt`.
    pub balances_slot: u64,
}

impl Settings {
    pub fn new(mining_timeout: Duration) -> Self {
        Self {
            mining_timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            filter_changes_wait: DEFAULT_FILTER_CHANGES_WAIT,
            balances_slot: DEFAULT_BALANCES_SLOT,
        }
    }
}

/// A log filter installed on the node, with the query it was created from.
#[derive(Clone, Debug)]
pub struct InstalledFilter {
    pub id: String,
    pub query: Filter,
    pub active: bool,
}

/// State shared by every probe of a run.
///
/// Owned by the runner and lent mutably to one probe at a time.
pub struct TestContext {
    client: Arc<dyn EthRpc>,
    account: Account,
    token: TokenContract,
    settings: Settings,

    chain_id: Option<u64>,
    gas_price: Option<u128>,
    max_priority_fee: Option<u128>,

    processed_transactions: Vec<TxHash>,
    blocks_with_tx: Vec<u64>,
    contract_address: Address,
    filter: Option<InstalledFilter>,
    block_filter_id: Option<String>,

    completed: Vec<Arc<RpcResult>>,
}

impl TestContext {
    pub fn new(
        client: Arc<dyn EthRpc>,
        account: Account,
        token: TokenContract,
        settings: Settings,
    ) -> Self {
        Self {
            client,
            account,
            token,
            settings,
            chain_id: None,
            gas_price: None,
            max_priority_fee: None,
            processed_transactions: Vec::new(),
            blocks_with_tx: Vec::new(),
            contract_address: Address::ZERO,
            filter: None,
            block_filter_id: None,
            completed: Vec::new(),
        }
    }

    pub fn client(&self) -> &dyn EthRpc {
        self.client.as_ref()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn token(&self) -> &TokenContract {
        &self.token
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // --- memoization ---

    /// The first result recorded for `method`, if any.
    pub fn already_tested(&self, method: RpcMethod) -> Option<Arc<RpcResult>> {
        self.completed.iter().find(|result| result.method == method).cloned()
    }

    /// Records a verdict. The first verdict for a method is authoritative; a later one is
    /// dropped and the existing one returned.
    pub fn record(&mut self, result: RpcResult) -> Arc<RpcResult> {
        if let Some(existing) = self.already_tested(result.method) {
            warn!(
                method = %result.method,
                kept = %existing.status,
                dropped = %result.status,
                "Discarding duplicate verdict"
            );
            return existing;
        }

        debug!(method = %result.method, status = %result.status, "Recorded verdict");
        let result = Arc::new(result);
        self.completed.push(result.clone());
        result
    }

    /// Records `result` unless its method already has a verdict.
    pub(crate) fn record_if_absent(&mut self, method: RpcMethod, make: impl FnOnce() -> RpcResult) {
        if self.already_tested(method).is_none() {
            self.record(make());
        }
    }

    pub fn completed(&self) -> &[Arc<RpcResult>] {
        &self.completed
    }

    // --- chain parameters ---

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn gas_price(&self) -> Option<u128> {
        self.gas_price
    }

    pub fn max_priority_fee(&self) -> Option<u128> {
        self.max_priority_fee
    }

    pub(crate) fn cache_chain_id(&mut self, chain_id: u64) {
        self.chain_id.get_or_insert(chain_id);
    }

    pub(crate) fn cache_gas_price(&mut self, gas_price: u128) {
        self.gas_price.get_or_insert(gas_price);
    }

    pub(crate) fn cache_max_priority_fee(&mut self, fee: u128) {
        self.max_priority_fee.get_or_insert(fee);
    }

    // --- mined transactions ---

    pub fn processed_transactions(&self) -> &[TxHash] {
        &self.processed_transactions
    }

    pub fn blocks_with_tx(&self) -> &[u64] {
        &self.blocks_with_tx
    }

    pub(crate) fn record_confirmed(&mut self, tx_hash: TxHash, block_number: u64) {
        self.processed_transactions.push(tx_hash);
        self.blocks_with_tx.push(block_number);
    }

    pub fn first_transaction(&self) -> Result<TxHash, ProbeError> {
        self.processed_transactions
            .first()
            .copied()
            .ok_or_else(|| ProbeError::missing("no transactions"))
    }

    pub fn first_block_with_tx(&self) -> Result<u64, ProbeError> {
        self.blocks_with_tx
            .first()
            .copied()
            .ok_or_else(|| ProbeError::missing("no blocks with transactions"))
    }

    // --- token contract ---

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Set once; later deployments do not move the address.
    pub(crate) fn set_contract_address(&mut self, address: Address) {
        if self.contract_address.is_zero() && !address.is_zero() {
            self.contract_address = address;
        }
    }

    pub fn require_contract(&self) -> Result<Address, ProbeError> {
        if self.contract_address.is_zero() {
            return Err(ProbeError::missing("no contract address, must be deployed first"));
        }
        Ok(self.contract_address)
    }

    // --- filters ---

    pub fn filter(&self) -> Option<&InstalledFilter> {
        self.filter.as_ref()
    }

    pub(crate) fn install_filter(&mut self, id: String, query: Filter) {
        self.filter = Some(InstalledFilter { id, query, active: true });
    }

    /// The query stays available for `eth_getLogs` after the id is gone.
    pub(crate) fn mark_filter_uninstalled(&mut self) {
        if let Some(filter) = self.filter.as_mut() {
            filter.active = false;
        }
    }

    pub fn require_filter(&self) -> Result<&InstalledFilter, ProbeError> {
        self.filter
            .as_ref()
            .ok_or_else(|| ProbeError::missing("no filter id, must create a filter first"))
    }

    /// Like [`Self::require_filter`], but the id must still be installed on the node.
    pub fn require_active_filter(&self) -> Result<&InstalledFilter, ProbeError> {
        let filter = self.require_filter()?;
        if !filter.active {
            return Err(ProbeError::missing(format!(
                "filter {} was uninstalled, must create a filter first",
                filter.id
            )));
        }
        Ok(filter)
    }

    pub fn block_filter_id(&self) -> Option<&str> {
        self.block_filter_id.as_deref()
    }

    pub(crate) fn set_block_filter_id(&mut self, id: String) {
        self.block_filter_id = Some(id);
    }

    pub fn require_block_filter(&self) -> Result<String, ProbeError> {
        self.block_filter_id
            .clone()
            .ok_or_else(|| {
                ProbeError::missing("no block filter id, must create a block filter first")
            })
    }
}

#[cfg(test)]
mod tests {
    use ethprobe_test_support::FakeNode;
    use ethprobe_types::Status;

    use super::*;
    use crate::test_utils::context_for;

    fn context() -> TestContext {
        context_for(FakeNode::builder().build())
    }

    #[test]
    fn first_verdict_wins() {
        let mut ctx = context();
        assert!(ctx.already_tested(RpcMethod::GasPrice).is_none());

        let first = ctx.record(RpcResult::ok(RpcMethod::GasPrice, "7"));
        let second = ctx.record(RpcResult::error(RpcMethod::GasPrice, "boom"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ctx.completed().len(), 1);
        assert_eq!(ctx.already_tested(RpcMethod::GasPrice).unwrap().status, Status::Ok);
    }

    #[test]
    fn missing_prerequisites_have_descriptive_messages() {
        let ctx = context();
        assert_eq!(ctx.first_transaction().unwrap_err().to_string(), "no transactions");
        assert_eq!(
            ctx.first_block_with_tx().unwrap_err().to_string(),
            "no blocks with transactions"
        );
        assert_eq!(
            ctx.require_contract().unwrap_err().to_string(),
            "no contract address, must be deployed first"
        );
        assert_eq!(
            ctx.require_filter().unwrap_err().to_string(),
            "no filter id, must create a filter first"
        );
        assert_eq!(
            ctx.require_block_filter().unwrap_err().to_string(),
            "no block filter id, must create a block filter first"
        );
    }

    #[test]
    fn contract_address_is_fixed_once_set() {
        let mut ctx = context();
        ctx.set_contract_address(Address::ZERO);
        assert!(ctx.contract_address().is_zero());

        ctx.set_contract_address(Address::repeat_byte(1));
        ctx.set_contract_address(Address::repeat_byte(2));
        assert_eq!(ctx.require_contract().unwrap(), Address::repeat_byte(1));
    }

    #[test]
    fn chain_parameters_are_cached_once() {
        let mut ctx = context();
        ctx.cache_gas_price(10);
        ctx.cache_gas_price(20);
        assert_eq!(ctx.gas_price(), Some(10));
    }

    #[test]
    fn uninstalled_filter_keeps_its_query() {
        let mut ctx = context();
        ctx.install_filter("0x1".into(), Filter::new().from_block(3u64));
        ctx.mark_filter_uninstalled();

        let filter = ctx.require_filter().unwrap();
        assert!(!filter.active);
        assert_eq!(filter.id, "0x1");
    }
}
