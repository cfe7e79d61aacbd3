//! Shared utilities for integration tests: a programmable JSON-RPC node and a
//! mock swap aggregator, both served by axum on ephemeral ports.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use alloy::primitives::{keccak256, Address, U256};
use alloy::sol_types::SolValue;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chain_gateway::config::NetworkOverride;
use chain_gateway::GatewayConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;

/// JSON-RPC error returned by a handler: `(code, message)`.
pub type RpcFailure = (i64, String);

/// A running mock node.
pub struct MockNode {
    pub url: String,
    hits: Arc<AtomicU32>,
}

impl MockNode {
    /// Requests received so far.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Start a node answering every request with `handler(method, params)`.
pub async fn start_mock_node<F>(handler: F) -> MockNode
where
    F: Fn(&str, &Value) -> Result<Value, RpcFailure> + Send + Sync + 'static,
{
    let hits = Arc::new(AtomicU32::new(0));
    let handler = Arc::new(handler);
    let counter = hits.clone();

    let app = Router::new().route(
        "/",
        post(move |Json(request): Json<Value>| {
            let handler = handler.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let id = request.get("id").cloned().unwrap_or(Value::Null);
                let method = request["method"].as_str().unwrap_or_default().to_string();
                let params = request.get("params").cloned().unwrap_or(Value::Null);
                let body = match handler(&method, &params) {
                    Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
                    Err((code, message)) => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": code, "message": message }
                    }),
                };
                Json(body)
            }
        }),
    );

    MockNode { url: serve(app).await, hits }
}

/// Start a node that answers every request with HTTP 500.
pub async fn start_failing_node() -> MockNode {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "upstream down")
            }
        }),
    );
    MockNode { url: serve(app).await, hits }
}

/// A URL nothing listens on.
pub const DEAD_URL: &str = "http://127.0.0.1:1";

/// First four bytes of the keccak hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Hex encoding of an ABI value, as a JSON string.
pub fn abi_hex<T: SolValue>(value: T) -> Value {
    Value::String(format!("0x{}", alloy::hex::encode(value.abi_encode())))
}

pub fn quantity(n: u64) -> Value {
    Value::String(format!("{n:#x}"))
}

/// Target and calldata of an `eth_call` request.
pub fn call_target(params: &Value) -> (Address, Vec<u8>) {
    let tx = &params[0];
    let to: Address = tx["to"].as_str().unwrap().parse().unwrap();
    let data = tx
        .get("input")
        .or_else(|| tx.get("data"))
        .and_then(Value::as_str)
        .unwrap_or("0x");
    (to, alloy::hex::decode(data).unwrap())
}

/// Metadata a mock ERC-20 contract answers with.
#[derive(Clone)]
pub struct MockToken {
    pub address: Address,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    pub total_supply: U256,
    pub balance: U256,
}

impl MockToken {
    /// Answer an `eth_call` aimed at this token, or `None` for other selectors.
    pub fn answer(&self, calldata: &[u8]) -> Option<Value> {
        let sel = &calldata[..4.min(calldata.len())];
        if sel == selector("symbol()") {
            Some(abi_hex(self.symbol.to_string()))
        } else if sel == selector("name()") {
            Some(abi_hex(self.name.to_string()))
        } else if sel == selector("decimals()") {
            Some(abi_hex(U256::from(self.decimals)))
        } else if sel == selector("totalSupply()") {
            Some(abi_hex(self.total_supply))
        } else if sel == selector("balanceOf(address)") {
            Some(abi_hex(self.balance))
        } else {
            None
        }
    }
}

/// A legacy-transaction receipt mined in `block`.
pub fn receipt_json(hash: &str, block: u64, success: bool, from: Address, to: Address) -> Value {
    json!({
        "type": "0x0",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": quantity(block),
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": format!("{from:#x}"),
        "to": format!("{to:#x}"),
        "contractAddress": null
    })
}

/// Gateway config whose `network` endpoints are exactly `urls`.
pub fn config_for(network: &str, urls: &[&str]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.default_network.0 = network.to_string();
    config.rpc.failover_delay_ms = 0;
    config.rpc.timeout_secs = 5;
    config.retry.max_attempts = 1;
    config.retry.base_delay_ms = 0;
    config.networks.insert(
        network.to_string(),
        NetworkOverride {
            rpc_url: urls.first().map(|u| u.to_string()),
            backup_urls: Some(urls.iter().skip(1).map(|u| u.to_string()).collect()),
        },
    );
    config
}

/// A running mock aggregator.
pub struct MockAggregator {
    pub base_url: String,
    quotes: Arc<AtomicU32>,
    swaps: Arc<AtomicU32>,
}

impl MockAggregator {
    pub fn quote_requests(&self) -> u32 {
        self.quotes.load(Ordering::SeqCst)
    }

    pub fn swap_requests(&self) -> u32 {
        self.swaps.load(Ordering::SeqCst)
    }
}

/// Start an aggregator answering `/{chain}/quote` with `to_amount` and
/// `/{chain}/swap` with `swap_tx` (the `tx` object) plus `toAmount`.
pub async fn start_mock_aggregator(to_amount: &'static str, swap_tx: Value) -> MockAggregator {
    aggregator(to_amount, swap_tx, true).await
}

/// Like [`start_mock_aggregator`], but `/{chain}/swap` answers `{"tx": ...}` only.
pub async fn start_bare_swap_aggregator(to_amount: &'static str, swap_tx: Value) -> MockAggregator {
    aggregator(to_amount, swap_tx, false).await
}

async fn aggregator(to_amount: &'static str, swap_tx: Value, swap_has_amount: bool) -> MockAggregator {
    let quotes = Arc::new(AtomicU32::new(0));
    let swaps = Arc::new(AtomicU32::new(0));
    let quote_counter = quotes.clone();
    let swap_counter = swaps.clone();

    let app = Router::new()
        .route(
            "/{chain}/quote",
            get(move |Path(_chain): Path<u64>, Query(query): Query<HashMap<String, String>>| {
                let counter = quote_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if query.get("src") == query.get("dst") {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "description": "src and dst are equal" })),
                        );
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "toAmount": to_amount,
                            "estimatedGas": 150000,
                            "protocols": [[[{ "name": "UNISWAP_V3", "part": 100 }]]]
                        })),
                    )
                }
            }),
        )
        .route(
            "/{chain}/swap",
            get(move |Path(_chain): Path<u64>| {
                let swap_tx = swap_tx.clone();
                let counter = swap_counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if swap_has_amount {
                        Json(json!({ "toAmount": to_amount, "tx": swap_tx }))
                    } else {
                        Json(json!({ "tx": swap_tx }))
                    }
                }
            }),
        );

    MockAggregator {
        base_url: serve(app).await,
        quotes,
        swaps,
    }
}
