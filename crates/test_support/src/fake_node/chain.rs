use std::collections::HashMap;

use alloy_consensus::{Transaction as _, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{Address, B256, Bytes, TxHash, TxKind, U64, U128, U256, keccak256};
use alloy_rpc_types_eth::BlockNumberOrTag;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{Knobs, render};
use crate::fixtures;

const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

const TRANSFER_GAS: u64 = 21_000;
const DEPLOY_GAS: u64 = 480_000;
const TOKEN_CALL_GAS: u64 = 51_000;

/// A JSON-RPC error object the node answers with.
#[derive(Debug)]
pub(crate) struct Fault {
    pub(crate) code: i64,
    pub(crate) message: String,
}

impl Fault {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self { code: -32602, message: message.into() }
    }

    fn server(message: impl Into<String>) -> Self {
        Self { code: -32000, message: message.into() }
    }
}

type Handled = Result<Value, Fault>;

#[derive(Clone, Debug)]
pub(crate) struct FakeBlock {
    pub(crate) number: u64,
    pub(crate) hash: B256,
    pub(crate) parent_hash: B256,
    pub(crate) timestamp: u64,
    pub(crate) gas_used: u64,
    pub(crate) transactions: Vec<TxHash>,
}

#[derive(Clone, Debug)]
pub(crate) struct FakeLog {
    pub(crate) address: Address,
    pub(crate) topics: Vec<B256>,
    pub(crate) data: Bytes,
    pub(crate) block_number: u64,
    pub(crate) block_hash: B256,
    pub(crate) tx_hash: TxHash,
    pub(crate) log_index: u64,
}

#[derive(Clone, Debug)]
pub(crate) struct Inclusion {
    pub(crate) block_number: u64,
    pub(crate) block_hash: B256,
    pub(crate) success: bool,
    pub(crate) gas_used: u64,
    pub(crate) contract_address: Option<Address>,
    pub(crate) logs: Vec<FakeLog>,
}

#[derive(Clone, Debug)]
pub(crate) struct FakeTx {
    pub(crate) envelope: TxEnvelope,
    pub(crate) from: Address,
    pub(crate) effective_gas_price: u128,
    pub(crate) inclusion: Option<Inclusion>,
}

/// A log filter as the node understood it.
#[derive(Clone, Debug, Default)]
struct LogQuery {
    from_block: Option<u64>,
    to_block: Option<u64>,
    addresses: Vec<Address>,
    topics: Vec<Vec<B256>>,
}

impl LogQuery {
    fn matches(&self, log: &FakeLog) -> bool {
        self.from_block.is_none_or(|from| log.block_number >= from) &&
            self.to_block.is_none_or(|to| log.block_number <= to) &&
            (self.addresses.is_empty() || self.addresses.contains(&log.address)) &&
            self.topics.iter().enumerate().all(|(position, wanted)| {
                wanted.is_empty() ||
                    log.topics.get(position).is_some_and(|topic| wanted.contains(topic))
            })
    }
}

#[derive(Clone, Debug)]
enum InstalledFilter {
    Logs { query: LogQuery, next_block: u64 },
    Blocks { next_block: u64 },
}

/// Chain state behind one [`super::FakeNode`].
#[derive(Debug)]
pub(crate) struct Chain {
    pub(crate) knobs: Knobs,
    pub(crate) calls: Vec<String>,
    sender: Address,
    blocks: Vec<FakeBlock>,
    txs: HashMap<TxHash, FakeTx>,
    nonce: u64,
    balances: HashMap<Address, U256>,
    code: HashMap<Address, Bytes>,
    storage: HashMap<(Address, B256), U256>,
    filters: HashMap<String, InstalledFilter>,
    next_filter_id: u64,
}

impl Chain {
    pub(crate) fn new(knobs: Knobs) -> Self {
        let sender = fixtures::funded_address();
        let genesis = FakeBlock {
            number: 0,
            hash: block_hash(0),
            parent_hash: B256::ZERO,
            timestamp: GENESIS_TIMESTAMP,
            gas_used: 0,
            transactions: Vec::new(),
        };
        let balances = HashMap::from([(sender, knobs.funded_balance)]);

        Self {
            knobs,
            calls: Vec::new(),
            sender,
            blocks: vec![genesis],
            txs: HashMap::new(),
            nonce: 0,
            balances,
            code: HashMap::new(),
            storage: HashMap::new(),
            filters: HashMap::new(),
            next_filter_id: 1,
        }
    }

    pub(crate) fn head(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    pub(crate) fn tx(&self, hash: &TxHash) -> Option<&FakeTx> {
        self.txs.get(hash)
    }

    pub(crate) fn handle(&mut self, method: &str, params: &Value) -> Handled {
        match method {
            "eth_chainId" => Ok(json!(U64::from(fixtures::CHAIN_ID))),
            "eth_blockNumber" => Ok(json!(U64::from(self.head()))),
            "eth_gasPrice" => Ok(json!(U128::from(self.knobs.gas_price))),
            "eth_maxPriorityFeePerGas" => Ok(json!(U128::from(fixtures::PRIORITY_FEE))),
            "eth_getBalance" => {
                let address: Address = param(params, 0)?;
                Ok(json!(self.balances.get(&address).copied().unwrap_or_default()))
            }
            "eth_getTransactionCount" => {
                let address: Address = param(params, 0)?;
                let nonce = if address == self.sender { self.nonce } else { 0 };
                Ok(json!(U64::from(nonce)))
            }
            "eth_getBlockByNumber" => {
                let number = self.block_param(params, 0)?;
                let full = param::<bool>(params, 1).unwrap_or(false);
                Ok(self
                    .block(number)
                    .map_or(Value::Null, |block| render::block(self, block, full, false)))
            }
            "eth_getBlockByHash" => {
                let hash: B256 = param(params, 0)?;
                let full = param::<bool>(params, 1).unwrap_or(false);
                let diverge = self.knobs.diverging_block_by_hash;
                Ok(self
                    .block_by_hash(&hash)
                    .map_or(Value::Null, |block| render::block(self, block, full, diverge)))
            }
            "eth_getBlockReceipts" => {
                let number = self.block_param(params, 0)?;
                Ok(self.block(number).map_or(Value::Null, |block| {
                    let receipts =
                        block.transactions.iter().filter_map(|hash| render::receipt(self, hash));
                    Value::Array(receipts.collect())
                }))
            }
            "eth_getBlockTransactionCountByHash" | "eth_getTransactionCountByHash" => {
                let hash: B256 = param(params, 0)?;
                Ok(self
                    .block_by_hash(&hash)
                    .map_or(Value::Null, |block| json!(U64::from(block.transactions.len()))))
            }
            "eth_getTransactionByHash" => {
                let hash: TxHash = param(params, 0)?;
                Ok(render::transaction(self, &hash).unwrap_or(Value::Null))
            }
            "eth_getTransactionByBlockHashAndIndex" => {
                let hash: B256 = param(params, 0)?;
                let index: U64 = param(params, 1)?;
                let block = self.block_by_hash(&hash);
                Ok(self.indexed_transaction(block, index.to()))
            }
            "eth_getTransactionByBlockNumberAndIndex" => {
                let number = self.block_param(params, 0)?;
                let index: U64 = param(params, 1)?;
                let block = self.block(number);
                Ok(self.indexed_transaction(block, index.to()))
            }
            "eth_getTransactionReceipt" => {
                let hash: TxHash = param(params, 0)?;
                Ok(render::receipt(self, &hash).unwrap_or(Value::Null))
            }
            "eth_getCode" => {
                let address: Address = param(params, 0)?;
                Ok(json!(self.code.get(&address).cloned().unwrap_or_default()))
            }
            "eth_getStorageAt" => {
                let address: Address = param(params, 0)?;
                let key: B256 = param(params, 1)?;
                let value = self.storage.get(&(address, key)).copied().unwrap_or_default();
                Ok(json!(B256::from(value.to_be_bytes::<32>())))
            }
            "eth_call" => self.call(params),
            "eth_estimateGas" => self.estimate_gas(params),
            "eth_sendRawTransaction" => self.send_raw_transaction(params),
            "eth_newFilter" => {
                let query = self.log_query(param_value(params, 0)?)?;
                let next_block = self.head() + 1;
                Ok(json!(self.install(InstalledFilter::Logs { query, next_block })))
            }
            "eth_newBlockFilter" => {
                let next_block = self.head() + 1;
                Ok(json!(self.install(InstalledFilter::Blocks { next_block })))
            }
            "eth_getFilterLogs" => {
                let id: String = param(params, 0)?;
                match self.filters.get(&id) {
                    Some(InstalledFilter::Logs { query, .. }) => Ok(self.logs_matching(query)),
                    _ => Err(Fault::server("filter not found")),
                }
            }
            "eth_getFilterChanges" => {
                let id: String = param(params, 0)?;
                self.filter_changes(&id)
            }
            "eth_uninstallFilter" => {
                let id: String = param(params, 0)?;
                if self.knobs.uninstall_always_false {
                    return Ok(json!(false));
                }
                let removed = self.filters.remove(&id).is_some();
                Ok(json!(removed || self.knobs.uninstall_always_true))
            }
            "eth_getLogs" => {
                let query = self.log_query(param_value(params, 0)?)?;
                Ok(self.logs_matching(&query))
            }
            other => Err(Fault {
                code: -32601,
                message: format!("the method {other} does not exist/is not available"),
            }),
        }
    }

    // --- lookups ---

    pub(crate) fn block(&self, number: u64) -> Option<&FakeBlock> {
        self.blocks.get(usize::try_from(number).ok()?)
    }

    fn block_by_hash(&self, hash: &B256) -> Option<&FakeBlock> {
        self.blocks.iter().find(|block| block.hash == *hash)
    }

    fn block_param(&self, params: &Value, index: usize) -> Result<u64, Fault> {
        let tag: BlockNumberOrTag = param(params, index)?;
        Ok(self.resolve_tag(tag))
    }

    fn resolve_tag(&self, tag: BlockNumberOrTag) -> u64 {
        match tag {
            BlockNumberOrTag::Number(number) => number,
            BlockNumberOrTag::Earliest => 0,
            _ => self.head(),
        }
    }

    fn indexed_transaction(&self, block: Option<&FakeBlock>, index: usize) -> Value {
        block
            .and_then(|block| block.transactions.get(index))
            .and_then(|hash| render::transaction(self, hash))
            .unwrap_or(Value::Null)
    }

    fn token_balance(&self, token: Address, holder: Address) -> U256 {
        self.storage.get(&(token, fixtures::balance_key(holder))).copied().unwrap_or_default()
    }

    // --- calls ---

    fn call(&self, params: &Value) -> Handled {
        let request = param_value(params, 0)?;
        let to: Option<Address> = field(request, "to")?;
        let input = call_input(request)?;

        let Some(to) = to.filter(|to| self.code.contains_key(to)) else {
            return Ok(json!(Bytes::new()));
        };
        if input.len() >= 36 && input[..4] == BALANCE_OF_SELECTOR {
            let holder = Address::from_slice(&input[16..36]);
            let balance = self.token_balance(to, holder);
            return Ok(json!(Bytes::from(balance.to_be_bytes::<32>().to_vec())));
        }
        Err(Fault::server("execution reverted"))
    }

    fn estimate_gas(&self, params: &Value) -> Handled {
        let request = param_value(params, 0)?;
        let to: Option<Address> = field(request, "to")?;
        let input = call_input(request)?;

        let gas = match to {
            None => DEPLOY_GAS,
            Some(to) if self.code.contains_key(&to) && input.starts_with(&TRANSFER_SELECTOR) => {
                TOKEN_CALL_GAS
            }
            Some(_) => TRANSFER_GAS,
        };
        Ok(json!(U64::from(gas)))
    }

    // --- transactions ---

    fn send_raw_transaction(&mut self, params: &Value) -> Handled {
        let raw: Bytes = param(params, 0)?;
        if self.knobs.reject_sends {
            return Err(Fault::server("transaction rejected"));
        }

        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| Fault::invalid_params(format!("invalid raw transaction: {e}")))?;
        if envelope.chain_id() != Some(fixtures::CHAIN_ID) {
            return Err(Fault::server("invalid chain id for signer"));
        }
        match envelope.nonce().cmp(&self.nonce) {
            std::cmp::Ordering::Less => return Err(Fault::server("nonce too low")),
            std::cmp::Ordering::Greater => return Err(Fault::server("nonce too high")),
            std::cmp::Ordering::Equal => {}
        }

        let hash = *envelope.tx_hash();
        // No base fee on this chain, so the sender pays exactly the tip.
        let effective_gas_price = envelope
            .max_priority_fee_per_gas()
            .unwrap_or_else(|| envelope.max_fee_per_gas())
            .min(envelope.max_fee_per_gas());

        self.nonce += 1;
        let tx = FakeTx { envelope, from: self.sender, effective_gas_price, inclusion: None };
        self.txs.insert(hash, tx);

        if !self.knobs.never_mine {
            self.mine(hash);
        }
        Ok(json!(hash))
    }

    /// Executes `hash` in a fresh block on top of the head.
    fn mine(&mut self, hash: TxHash) {
        let Some(tx) = self.txs.get(&hash).cloned() else { return };

        let number = self.head() + 1;
        let block_hash = block_hash(number);
        let envelope = &tx.envelope;

        let (success, gas_used, contract_address, logs) = match envelope.kind() {
            TxKind::Create if self.knobs.revert_deployments => {
                (false, DEPLOY_GAS, None, Vec::new())
            }
            TxKind::Create => {
                let address = tx.from.create(envelope.nonce());
                self.code.insert(address, envelope.input().clone());
                self.storage
                    .insert((address, fixtures::balance_key(tx.from)), fixtures::token_supply());
                let reported = (!self.knobs.omit_contract_address).then_some(address);
                (true, DEPLOY_GAS, reported, Vec::new())
            }
            TxKind::Call(to) if self.code.contains_key(&to) => {
                match self.token_transfer(to, tx.from, envelope.input()) {
                    Some((recipient, amount)) => {
                        let log = FakeLog {
                            address: to,
                            topics: vec![
                                transfer_topic(),
                                tx.from.into_word(),
                                recipient.into_word(),
                            ],
                            data: Bytes::from(amount.to_be_bytes::<32>().to_vec()),
                            block_number: number,
                            block_hash,
                            tx_hash: hash,
                            log_index: 0,
                        };
                        (true, TOKEN_CALL_GAS, None, vec![log])
                    }
                    None => (false, TOKEN_CALL_GAS, None, Vec::new()),
                }
            }
            TxKind::Call(to) => {
                *self.balances.entry(to).or_default() += envelope.value();
                (true, TRANSFER_GAS, None, Vec::new())
            }
        };

        if !self.knobs.frozen_balance {
            let cost = U256::from(gas_used) * U256::from(tx.effective_gas_price) +
                if success { envelope.value() } else { U256::ZERO };
            let balance = self.balances.entry(tx.from).or_default();
            *balance = balance.saturating_sub(cost);
        }

        self.blocks.push(FakeBlock {
            number,
            hash: block_hash,
            parent_hash: self.blocks[self.blocks.len() - 1].hash,
            timestamp: GENESIS_TIMESTAMP + number * 2,
            gas_used,
            transactions: vec![hash],
        });

        if let Some(tx) = self.txs.get_mut(&hash) {
            tx.inclusion = Some(Inclusion {
                block_number: number,
                block_hash,
                success,
                gas_used,
                contract_address,
                logs,
            });
        }
    }

    /// Applies an ERC-20 `transfer`; `None` means the call reverts.
    fn token_transfer(
        &mut self,
        token: Address,
        from: Address,
        input: &Bytes,
    ) -> Option<(Address, U256)> {
        if input.len() < 68 || input[..4] != TRANSFER_SELECTOR {
            return None;
        }
        let recipient = Address::from_slice(&input[16..36]);
        let amount = U256::from_be_slice(&input[36..68]);

        let sender_balance = self.token_balance(token, from);
        if sender_balance < amount {
            return None;
        }
        self.storage.insert((token, fixtures::balance_key(from)), sender_balance - amount);
        *self.storage.entry((token, fixtures::balance_key(recipient))).or_default() += amount;

        Some((recipient, amount))
    }

    // --- filters ---

    fn install(&mut self, filter: InstalledFilter) -> String {
        let id = format!("{:#x}", self.next_filter_id);
        self.next_filter_id += 1;
        self.filters.insert(id.clone(), filter);
        id
    }

    fn log_query(&self, value: &Value) -> Result<LogQuery, Fault> {
        let from_block: Option<BlockNumberOrTag> = field(value, "fromBlock")?;
        let to_block: Option<BlockNumberOrTag> = field(value, "toBlock")?;

        let topics = match value.get("topics") {
            Some(Value::Array(positions)) => {
                positions.iter().map(one_or_many).collect::<Result<_, _>>()?
            }
            _ => Vec::new(),
        };

        Ok(LogQuery {
            from_block: from_block.map(|tag| self.resolve_tag(tag)),
            to_block: to_block.map(|tag| self.resolve_tag(tag)),
            addresses: value.get("address").map(one_or_many).transpose()?.unwrap_or_default(),
            topics,
        })
    }

    fn all_logs(&self) -> impl Iterator<Item = &FakeLog> {
        self.blocks
            .iter()
            .flat_map(|block| block.transactions.iter())
            .filter_map(|hash| self.txs.get(hash)?.inclusion.as_ref())
            .flat_map(|inclusion| inclusion.logs.iter())
    }

    fn logs_matching(&self, query: &LogQuery) -> Value {
        Value::Array(self.all_logs().filter(|log| query.matches(log)).map(render::log).collect())
    }

    fn filter_changes(&mut self, id: &str) -> Handled {
        let head = self.head();
        let filter =
            self.filters.get(id).cloned().ok_or_else(|| Fault::server("filter not found"))?;

        let (changes, updated) = match filter {
            InstalledFilter::Blocks { next_block } => {
                let hashes: Vec<_> = self
                    .blocks
                    .iter()
                    .skip(next_block as usize)
                    .map(|block| json!(block.hash))
                    .collect();
                (Value::Array(hashes), InstalledFilter::Blocks { next_block: head + 1 })
            }
            InstalledFilter::Logs { query, next_block } => {
                let logs = self
                    .all_logs()
                    .filter(|log| log.block_number >= next_block && query.matches(log))
                    .map(render::log)
                    .collect();
                (Value::Array(logs), InstalledFilter::Logs { query, next_block: head + 1 })
            }
        };

        self.filters.insert(id.to_string(), updated);
        Ok(changes)
    }
}

const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

fn block_hash(number: u64) -> B256 {
    keccak256([b"fake-node-block".as_slice(), &number.to_be_bytes()].concat())
}

fn transfer_topic() -> B256 {
    keccak256("Transfer(address,address,uint256)")
}

fn param_value(params: &Value, index: usize) -> Result<&Value, Fault> {
    params
        .get(index)
        .ok_or_else(|| {
            Fault::invalid_params(format!("missing value for required argument {index}"))
        })
}

fn param<T: DeserializeOwned>(params: &Value, index: usize) -> Result<T, Fault> {
    serde_json::from_value(param_value(params, index)?.clone())
        .map_err(|e| Fault::invalid_params(format!("invalid argument {index}: {e}")))
}

fn field<T: DeserializeOwned>(object: &Value, name: &str) -> Result<Option<T>, Fault> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| Fault::invalid_params(format!("invalid field {name}: {e}"))),
    }
}

fn call_input(request: &Value) -> Result<Bytes, Fault> {
    Ok(field(request, "input")?.or(field(request, "data")?).unwrap_or_default())
}

/// A filter position: null, a single value or a list of alternatives.
fn one_or_many<T: DeserializeOwned>(value: &Value) -> Result<Vec<T>, Fault> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items.clone(),
        single => vec![single.clone()],
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| Fault::invalid_params(format!("invalid filter: {e}")))
        })
        .collect()
}
