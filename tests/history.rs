//! History reconstruction from full blocks and receipts served by a mock node.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, keccak256, Address, TxHash, U256};
use chain_gateway::history::{Direction, TxStatus};
use chain_gateway::tokens::MemoryTokenStore;
use chain_gateway::Gateway;
use serde_json::{json, Value};

mod common;

use common::{config_for, quantity, receipt_json, start_mock_node};

const WALLET: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const OTHER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
const STRANGER: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");
const TIP: u64 = 20;
const GENESIS_TIME: u64 = 1_700_000_000;

fn tx_hash(block: u64) -> TxHash {
    keccak256(block.to_be_bytes())
}

fn hash32(byte: u8) -> String {
    format!("0x{}", format!("{byte:02x}").repeat(32))
}

/// One transfer per block; `None` for blocks served as hashes only.
fn transfer(block: u64) -> Option<(Address, Address, U256, bool)> {
    let ether = U256::from(10u64).pow(U256::from(18));
    match block {
        20 => Some((WALLET, OTHER, ether, true)),
        19 => Some((OTHER, STRANGER, ether, true)),
        18 => Some((OTHER, WALLET, ether / U256::from(2), true)),
        17 => Some((WALLET, STRANGER, U256::ZERO, false)),
        16 => None,
        n if n % 2 == 0 => Some((WALLET, OTHER, ether, true)),
        _ => Some((OTHER, WALLET, ether, true)),
    }
}

fn tx_json(block: u64, from: Address, to: Address, value: U256) -> Value {
    json!({
        "type": "0x0",
        "hash": format!("{:#x}", tx_hash(block)),
        "nonce": quantity(block),
        "blockHash": hash32(block as u8),
        "blockNumber": quantity(block),
        "transactionIndex": "0x0",
        "from": format!("{from:#x}"),
        "to": format!("{to:#x}"),
        "value": format!("0x{value:x}"),
        "gasPrice": "0x3b9aca00",
        "gas": "0x5208",
        "input": "0x",
        "chainId": "0x1",
        "v": "0x25",
        "r": "0x1b5e176d927f8e9ab405058b2d2457392da3e20f328b16ddabcebc33eaac5fea",
        "s": "0x4ba69724e8f69de52f0125ad8b3c5c2cef33019bac3249e2c0a2192766d1721c"
    })
}

fn block_json(number: u64) -> Value {
    let transactions = match transfer(number) {
        Some((from, to, value, _)) => json!([tx_json(number, from, to, value)]),
        None => json!([format!("{:#x}", tx_hash(number))]),
    };
    json!({
        "hash": hash32(number as u8),
        "parentHash": hash32(number.saturating_sub(1) as u8),
        "sha3Uncles": hash32(0x1d),
        "miner": format!("{:#x}", Address::ZERO),
        "stateRoot": hash32(0x51),
        "transactionsRoot": hash32(0x52),
        "receiptsRoot": hash32(0x53),
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "difficulty": "0x0",
        "number": quantity(number),
        "gasLimit": "0x1c9c380",
        "gasUsed": "0x5208",
        "timestamp": quantity(GENESIS_TIME + number * 12),
        "extraData": "0x",
        "mixHash": hash32(0),
        "nonce": "0x0000000000000000",
        "baseFeePerGas": "0x7",
        "size": "0x220",
        "uncles": [],
        "transactions": transactions
    })
}

fn parse_quantity(value: &Value) -> u64 {
    u64::from_str_radix(value.as_str().unwrap().trim_start_matches("0x"), 16).unwrap()
}

async fn gateway_with_chain() -> (Gateway, Arc<Mutex<Vec<u64>>>, common::MockNode) {
    let receipts: HashMap<String, bool> = (1..=TIP)
        .filter_map(|n| transfer(n).map(|(_, _, _, ok)| (format!("{:#x}", tx_hash(n)), ok)))
        .collect();
    let fetched = Arc::new(Mutex::new(Vec::new()));
    let blocks = fetched.clone();

    let node = start_mock_node(move |method, params| match method {
        "eth_blockNumber" => Ok(quantity(TIP)),
        "eth_getBlockByNumber" => {
            let number = parse_quantity(&params[0]);
            blocks.lock().unwrap().push(number);
            Ok(if (1..=TIP).contains(&number) { block_json(number) } else { Value::Null })
        }
        "eth_getTransactionReceipt" => {
            let hash = params[0].as_str().unwrap();
            Ok(match receipts.get(hash) {
                Some(success) => receipt_json(hash, 0, *success, WALLET, OTHER),
                None => Value::Null,
            })
        }
        other => Err((-32601, format!("method {other} not found"))),
    })
    .await;

    let config = config_for("ethereum", &[&node.url]);
    let gateway = Gateway::with_store(config, Arc::new(MemoryTokenStore::new())).unwrap();
    (gateway, fetched, node)
}

#[tokio::test]
async fn test_history_newest_first_within_limit() {
    let (gateway, fetched, _node) = gateway_with_chain().await;

    let records = gateway.history(Some(WALLET), Some(5)).await.unwrap();
    assert_eq!(records.len(), 5);
    let blocks: Vec<u64> = records.iter().map(|r| r.block_number).collect();
    assert_eq!(blocks, vec![20, 18, 17, 15, 14]);
    assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let sent = &records[0];
    assert_eq!(sent.hash, tx_hash(20));
    assert_eq!(sent.direction, Direction::Sent);
    assert_eq!(sent.status, TxStatus::Success);
    assert_eq!(sent.from, WALLET);
    assert_eq!(sent.to, Some(OTHER));
    assert_eq!(sent.value_native, "1.0");
    assert_eq!(sent.gas_used, 21_000);
    assert_eq!(sent.gas_price, 1_000_000_000);
    assert_eq!(sent.timestamp, GENESIS_TIME + 20 * 12);

    let received = &records[1];
    assert_eq!(received.direction, Direction::Received);
    assert_eq!(received.value_native, "0.5");

    let failed = &records[2];
    assert_eq!(failed.direction, Direction::Sent);
    assert_eq!(failed.status, TxStatus::Failed);

    // Enough matches by block 14; nothing older is fetched.
    let fetched = fetched.lock().unwrap();
    assert!(fetched.contains(&16));
    assert!(!fetched.iter().any(|n| *n < 14));
}

#[tokio::test]
async fn test_history_skips_blocks_without_bodies() {
    let (gateway, _fetched, _node) = gateway_with_chain().await;

    let records = gateway.history(Some(WALLET), Some(50)).await.unwrap();
    assert!(records.iter().all(|r| r.block_number != 16));
    assert!(records.iter().all(|r| r.hash != tx_hash(19)));
    // 20 blocks, minus the unrelated one and the hashes-only one.
    assert_eq!(records.len(), 18);
    assert_eq!(records.last().unwrap().block_number, 1);
}
