//! Wire-format JSON for the objects the fake chain serves, shaped like geth's responses.

use alloy_consensus::Transaction as _;
use alloy_primitives::{Address, B256, Bloom, Bytes, TxHash, U64, U128, U256};
use serde_json::{Value, json};

use super::chain::{Chain, FakeBlock, FakeLog};

const GAS_LIMIT: u64 = 30_000_000;

pub(super) fn block(chain: &Chain, block: &FakeBlock, full: bool, diverge: bool) -> Value {
    let transactions: Vec<Value> = if full {
        block.transactions.iter().filter_map(|hash| transaction(chain, hash)).collect()
    } else {
        block.transactions.iter().map(|hash| json!(hash)).collect()
    };
    let extra_data = if diverge { Bytes::from_static(b"\x01") } else { Bytes::new() };

    json!({
        "hash": block.hash,
        "parentHash": block.parent_hash,
        "sha3Uncles": B256::ZERO,
        "miner": Address::ZERO,
        "stateRoot": B256::ZERO,
        "transactionsRoot": B256::ZERO,
        "receiptsRoot": B256::ZERO,
        "logsBloom": Bloom::ZERO,
        "difficulty": U256::ZERO,
        "number": U64::from(block.number),
        "gasLimit": U64::from(GAS_LIMIT),
        "gasUsed": U64::from(block.gas_used),
        "timestamp": U64::from(block.timestamp),
        "extraData": extra_data,
        "mixHash": B256::ZERO,
        "nonce": "0x0000000000000000",
        "baseFeePerGas": U64::ZERO,
        "size": U64::from(0x220),
        "uncles": [],
        "transactions": transactions,
    })
}

pub(super) fn transaction(chain: &Chain, hash: &TxHash) -> Option<Value> {
    let tx = chain.tx(hash)?;
    let mut value = serde_json::to_value(&tx.envelope).ok()?;
    let object = value.as_object_mut()?;

    object.insert("hash".into(), json!(hash));
    object.insert("from".into(), json!(tx.from));
    object.insert("gasPrice".into(), json!(U128::from(tx.effective_gas_price)));
    match &tx.inclusion {
        Some(inclusion) => {
            object.insert("blockHash".into(), json!(inclusion.block_hash));
            object.insert("blockNumber".into(), json!(U64::from(inclusion.block_number)));
            object.insert("transactionIndex".into(), json!(U64::ZERO));
        }
        None => {
            object.insert("blockHash".into(), Value::Null);
            object.insert("blockNumber".into(), Value::Null);
            object.insert("transactionIndex".into(), Value::Null);
        }
    }

    Some(value)
}

/// `None` until the transaction is mined.
pub(super) fn receipt(chain: &Chain, hash: &TxHash) -> Option<Value> {
    let tx = chain.tx(hash)?;
    let inclusion = tx.inclusion.as_ref()?;
    let status = if inclusion.success { "0x1" } else { "0x0" };
    let (block_hash, block_number) = if chain.knobs.receipts_without_block {
        (None, None)
    } else {
        (Some(inclusion.block_hash), Some(U64::from(inclusion.block_number)))
    };

    Some(json!({
        "type": "0x2",
        "status": status,
        "cumulativeGasUsed": U64::from(inclusion.gas_used),
        "logs": inclusion.logs.iter().map(log).collect::<Vec<_>>(),
        "logsBloom": Bloom::ZERO,
        "transactionHash": hash,
        "transactionIndex": U64::ZERO,
        "blockHash": block_hash,
        "blockNumber": block_number,
        "gasUsed": U64::from(inclusion.gas_used),
        "effectiveGasPrice": U128::from(tx.effective_gas_price),
        "from": tx.from,
        "to": tx.envelope.to(),
        "contractAddress": inclusion.contract_address,
    }))
}

pub(super) fn log(log: &FakeLog) -> Value {
    json!({
        "address": log.address,
        "topics": log.topics,
        "data": log.data,
        "blockHash": log.block_hash,
        "blockNumber": U64::from(log.block_number),
        "transactionHash": log.tx_hash,
        "transactionIndex": U64::ZERO,
        "logIndex": U64::from(log.log_index),
        "removed": false,
    })
}
