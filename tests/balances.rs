//! Balance aggregation over the built-in token list.

use std::sync::Arc;

use alloy::primitives::{address, Address, U256};
use chain_gateway::tokens::MemoryTokenStore;
use chain_gateway::{Gateway, GatewayError};
use serde_json::Value;

mod common;

use common::{abi_hex, call_target, config_for, selector, start_mock_node};

const WALLET: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
const USDT: Address = address!("dAC17F958D2ee523a2206206994597C13D831ec7");

async fn gateway() -> (Gateway, common::MockNode) {
    let node = start_mock_node(|method, params| match method {
        // 1.5 ETH
        "eth_getBalance" => Ok(Value::String("0x14d1120d7b160000".into())),
        "eth_call" => {
            let (to, data) = call_target(params);
            if to == USDT {
                return Err((3, "execution reverted".to_string()));
            }
            let sel = &data[..4];
            if sel == selector("decimals()") {
                let decimals = if to == USDC { 6u8 } else { 18u8 };
                Ok(abi_hex(U256::from(decimals)))
            } else if sel == selector("balanceOf(address)") {
                let balance = if to == USDC { 2_500_000u64 } else { 0 };
                Ok(abi_hex(U256::from(balance)))
            } else {
                Err((3, "execution reverted".to_string()))
            }
        }
        other => Err((-32601, format!("method {other} not found"))),
    })
    .await;

    let gateway = Gateway::with_store(
        config_for("ethereum", &[&node.url]),
        Arc::new(MemoryTokenStore::new()),
    )
    .unwrap();
    (gateway, node)
}

#[tokio::test]
async fn test_native_balance() {
    let (gateway, _node) = gateway().await;
    let snapshot = gateway.native_balance(Some(WALLET)).await.unwrap();
    assert!(snapshot.token.is_native());
    assert_eq!(snapshot.decimals, 18);
    assert_eq!(snapshot.balance, "1.5");
    assert_eq!(snapshot.formatted_balance, "1.500000");
}

#[tokio::test]
async fn test_token_balance_uses_contract_decimals() {
    let (gateway, _node) = gateway().await;
    let usdc = gateway.find_token("USDC").unwrap();
    let snapshot = gateway.token_balance(&usdc, Some(WALLET)).await.unwrap();
    assert_eq!(snapshot.raw_balance, U256::from(2_500_000u64));
    assert_eq!(snapshot.decimals, 6);
    assert_eq!(snapshot.balance, "2.5");

    let usdt = gateway.find_token("USDT").unwrap();
    let err = gateway.token_balance(&usdt, Some(WALLET)).await.unwrap_err();
    assert!(matches!(err, GatewayError::Reverted(_)));
}

#[tokio::test]
async fn test_all_balances_reports_failures_as_zero() {
    let (gateway, _node) = gateway().await;
    let balances = gateway.all_balances(Some(WALLET)).await.unwrap();

    let expected = gateway.all_tokens().unwrap().len();
    assert_eq!(balances.len(), expected);

    let by_symbol = |symbol: &str| {
        balances
            .iter()
            .find(|b| b.token.symbol == symbol)
            .unwrap_or_else(|| panic!("missing {symbol}"))
    };
    assert_eq!(by_symbol("ETH").balance, "1.5");
    assert_eq!(by_symbol("USDC").formatted_balance, "2.500000");

    let usdt = by_symbol("USDT");
    assert!(usdt.is_zero());
    assert_eq!(usdt.decimals, 6);
    assert_eq!(usdt.balance, "0.0");
}

#[tokio::test]
async fn test_balances_need_an_owner() {
    let (gateway, _node) = gateway().await;
    assert!(matches!(
        gateway.native_balance(None).await,
        Err(GatewayError::NoWalletConnected)
    ));
}
