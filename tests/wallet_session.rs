//! Wallet connect, switch and disconnect flows against mock nodes.

use std::sync::Arc;

use alloy::primitives::{address, Address};
use chain_gateway::tokens::MemoryTokenStore;
use chain_gateway::wallet::KeySource;
use chain_gateway::{Gateway, GatewayConfig, GatewayError};

mod common;

use common::{config_for, quantity, start_mock_node, MockNode};

const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const ANVIL_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";
const SECOND_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const SECOND_ADDRESS: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

async fn chain_node(chain_id: u64) -> MockNode {
    start_mock_node(move |method, _| match method {
        "eth_chainId" => Ok(quantity(chain_id)),
        other => Err((-32601, format!("method {other} not found"))),
    })
    .await
}

fn gateway(config: GatewayConfig) -> Gateway {
    Gateway::with_store(config, Arc::new(MemoryTokenStore::new())).unwrap()
}

#[tokio::test]
async fn test_connect_with_private_key() {
    let node = chain_node(1).await;
    let mut gateway = gateway(config_for("ethereum", &[&node.url]));

    let info = gateway.connect_with_private_key(ANVIL_KEY).await.unwrap();
    assert_eq!(info.address, ANVIL_ADDRESS);
    assert_eq!(info.chain_id, 1);
    assert_eq!(info.network, "ethereum");
    assert!(info.can_sign);
    assert!(info.chain_mismatch.is_none());

    let wallet = gateway.wallet_info().unwrap();
    assert_eq!(wallet.source, KeySource::PrivateKey);
    assert!(wallet.derivation_path.is_none());
    // 0x04 || X || Y
    assert_eq!(wallet.public_key.len(), 2 + 130);
    assert!(wallet.public_key.starts_with("0x04"));
}

#[tokio::test]
async fn test_connect_with_mnemonic() {
    let node = chain_node(1).await;
    let mut gateway = gateway(config_for("ethereum", &[&node.url]));

    let info = gateway
        .connect_with_mnemonic(&format!("  {}  ", TEST_MNEMONIC.to_uppercase()))
        .await
        .unwrap();
    assert_eq!(info.address, ANVIL_ADDRESS);

    let wallet = gateway.wallet_info().unwrap();
    assert_eq!(wallet.source, KeySource::Mnemonic);
    assert_eq!(wallet.derivation_path.as_deref(), Some("m/44'/60'/0'/0/0"));
}

#[tokio::test]
async fn test_malformed_credentials_are_rejected() {
    let node = chain_node(1).await;
    let mut gateway = gateway(config_for("ethereum", &[&node.url]));

    let eleven_words = "test test test test test test test test test test junk";
    let err = gateway.connect_with_mnemonic(eleven_words).await.unwrap_err();
    assert!(err.is_invalid_input());

    let short_key = &ANVIL_KEY[..65];
    assert_eq!(short_key.len(), 65);
    let err = gateway.connect_with_private_key(short_key).await.unwrap_err();
    assert!(err.is_invalid_input());

    // 63 hex digits without prefix.
    let err = gateway.connect_with_private_key(&ANVIL_KEY[3..]).await.unwrap_err();
    assert!(err.is_invalid_input());

    // Malformed input never reaches the network.
    assert_eq!(node.hits(), 0);
    assert!(!gateway.wallet().is_connected());
}

#[tokio::test]
async fn test_failed_connect_discards_previous_wallet() {
    let node = chain_node(1).await;
    let mut gateway = gateway(config_for("ethereum", &[&node.url]));

    gateway.connect_with_private_key(ANVIL_KEY).await.unwrap();
    assert!(gateway.wallet().can_sign());

    let err = gateway.connect_with_private_key("0xnothex").await.unwrap_err();
    assert!(err.is_invalid_input());
    assert!(!gateway.wallet().can_sign());
    assert!(matches!(gateway.wallet_info(), Err(GatewayError::NoWalletConnected)));
}

#[tokio::test]
async fn test_reconnect_replaces_wallet() {
    let node = chain_node(1).await;
    let mut gateway = gateway(config_for("ethereum", &[&node.url]));

    gateway.connect_with_private_key(ANVIL_KEY).await.unwrap();
    let info = gateway.connect_with_private_key(SECOND_KEY).await.unwrap();
    assert_eq!(info.address, SECOND_ADDRESS);
    assert_eq!(gateway.wallet().address(), Some(SECOND_ADDRESS));
}

#[tokio::test]
async fn test_disconnect() {
    let node = chain_node(1).await;
    let mut gateway = gateway(config_for("ethereum", &[&node.url]));

    gateway.connect_with_private_key(ANVIL_KEY).await.unwrap();
    gateway.disconnect();

    assert!(!gateway.wallet().can_sign());
    assert_eq!(gateway.wallet().address(), None);
    assert!(matches!(
        gateway.send_native(ANVIL_ADDRESS, "0.1").await,
        Err(GatewayError::NoWalletConnected)
    ));
    // Disconnecting twice is harmless.
    gateway.disconnect();
}

#[tokio::test]
async fn test_chain_mismatch_warns_by_default() {
    let node = chain_node(31337).await;
    let mut gateway = gateway(config_for("ethereum", &[&node.url]));

    let info = gateway.connect_with_private_key(ANVIL_KEY).await.unwrap();
    assert_eq!(info.chain_id, 31337);
    let mismatch = info.chain_mismatch.unwrap();
    assert_eq!(mismatch.expected, 1);
    assert_eq!(mismatch.actual, 31337);
    assert_eq!(gateway.wallet().signer().unwrap().chain_id(), 31337);
}

#[tokio::test]
async fn test_chain_mismatch_fails_in_strict_mode() {
    let node = chain_node(31337).await;
    let mut config = config_for("ethereum", &[&node.url]);
    config.wallet.strict_chain_id = true;
    let mut gateway = gateway(config);

    let err = gateway.connect_with_private_key(ANVIL_KEY).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::ChainMismatch {
            expected: 1,
            actual: 31337
        }
    ));
    assert!(!gateway.wallet().is_connected());
}

#[tokio::test]
async fn test_unreachable_network_fails_connection() {
    let mut gateway = gateway(config_for("ethereum", &[common::DEAD_URL]));
    let err = gateway.connect_with_private_key(ANVIL_KEY).await.unwrap_err();
    assert!(matches!(err, GatewayError::ConnectionFailed(_)));
    assert!(!gateway.wallet().is_connected());
}

#[tokio::test]
async fn test_switch_network_rebinds_wallet() {
    let eth = chain_node(1).await;
    let bsc = chain_node(56).await;
    let mut config = config_for("ethereum", &[&eth.url]);
    config.networks.extend(config_for("bsc", &[&bsc.url]).networks);
    config.networks.extend(config_for("optimism", &[common::DEAD_URL]).networks);
    let mut gateway = gateway(config);

    gateway.connect_with_private_key(ANVIL_KEY).await.unwrap();

    let info = gateway.set_network("bsc").await.unwrap().unwrap();
    assert_eq!(info.chain_id, 56);
    assert_eq!(info.address, ANVIL_ADDRESS);
    assert_eq!(gateway.wallet().signer().unwrap().network().key, "bsc");

    // A failed switch leaves both the network and the binding untouched.
    let err = gateway.set_network("optimism").await.unwrap_err();
    assert!(matches!(err, GatewayError::ConnectionFailed(_)));
    assert_eq!(gateway.active_network().key, "bsc");
    assert_eq!(gateway.wallet().signer().unwrap().chain_id(), 56);
}
