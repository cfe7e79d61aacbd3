//! Wallet session lifecycle.
//!
//! # Responsibilities
//! - Hold at most one set of key material
//! - Bind it to a network after an `eth_chainId` handshake
//! - Rebind on network switch, drop everything on disconnect

use std::sync::Arc;

use alloy::primitives::{hex, Address};
use alloy::signers::local::PrivateKeySigner;
use serde::Serialize;

use crate::config::WalletConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::network::NetworkDescriptor;
use crate::resilience::{with_retry, RetryPolicy};
use crate::rpc::EndpointPool;
use crate::wallet::credentials::{self, KeySource};
use crate::wallet::signer::BoundSigner;

/// Expected versus observed chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainIdMismatch {
    pub expected: u64,
    pub actual: u64,
}

/// Result of a successful connect or network switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub address: Address,
    /// Chain id reported by the network.
    pub chain_id: u64,
    pub network: String,
    pub can_sign: bool,
    /// Set when the network reported a different chain id than the registry.
    pub chain_mismatch: Option<ChainIdMismatch>,
}

/// Read-only view of the connected wallet. Holds no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletInfo {
    pub address: Address,
    pub source: KeySource,
    pub derivation_path: Option<String>,
    /// Uncompressed SEC1 public key, 0x-prefixed.
    pub public_key: String,
}

struct KeyMaterial {
    signer: PrivateKeySigner,
    source: KeySource,
    derivation_path: Option<String>,
}

enum SessionState {
    Disconnected,
    Connected { key: KeyMaterial, bound: BoundSigner },
}

/// The one ephemeral wallet.
pub struct WalletSession {
    settings: WalletConfig,
    retry: RetryPolicy,
    state: SessionState,
}

impl WalletSession {
    pub fn new(settings: WalletConfig, retry: RetryPolicy) -> Self {
        Self {
            settings,
            retry,
            state: SessionState::Disconnected,
        }
    }

    /// Connect from a 12 or 24 word BIP-39 phrase.
    ///
    /// Any previously held key material is dropped first, even if this call fails.
    pub async fn connect_with_mnemonic(
        &mut self,
        phrase: &str,
        network: Arc<NetworkDescriptor>,
        pool: &EndpointPool,
    ) -> GatewayResult<ConnectionInfo> {
        self.discard();
        let signer = credentials::signer_from_mnemonic(phrase, &self.settings.derivation_path)?;
        let key = KeyMaterial {
            signer,
            source: KeySource::Mnemonic,
            derivation_path: Some(self.settings.derivation_path.clone()),
        };
        self.establish(key, network, pool).await
    }

    /// Connect from a raw hex private key.
    pub async fn connect_with_private_key(
        &mut self,
        private_key_hex: &str,
        network: Arc<NetworkDescriptor>,
        pool: &EndpointPool,
    ) -> GatewayResult<ConnectionInfo> {
        self.discard();
        let signer = credentials::signer_from_private_key(private_key_hex)?;
        let key = KeyMaterial {
            signer,
            source: KeySource::PrivateKey,
            derivation_path: None,
        };
        self.establish(key, network, pool).await
    }

    /// Rebind the held key to another network.
    ///
    /// On failure the session stays bound to its previous network.
    pub async fn switch_network(
        &mut self,
        network: Arc<NetworkDescriptor>,
        pool: &EndpointPool,
    ) -> GatewayResult<ConnectionInfo> {
        let SessionState::Connected { key, .. } = &self.state else {
            return Err(GatewayError::NoWalletConnected);
        };
        let (bound, info) = self.bind(&key.signer, network, pool).await?;
        if let SessionState::Connected { bound: current, .. } = &mut self.state {
            *current = bound;
        }
        tracing::info!(
            address = %info.address,
            network = %info.network,
            chain_id = info.chain_id,
            "Wallet switched network"
        );
        Ok(info)
    }

    /// Drop all key material.
    pub fn disconnect(&mut self) {
        if self.discard() {
            tracing::info!("Wallet disconnected");
        }
    }

    pub fn can_sign(&self) -> bool {
        matches!(self.state, SessionState::Connected { .. })
    }

    pub fn is_connected(&self) -> bool {
        self.can_sign()
    }

    pub fn address(&self) -> Option<Address> {
        match &self.state {
            SessionState::Connected { bound, .. } => Some(bound.address()),
            SessionState::Disconnected => None,
        }
    }

    /// Signer for the current network.
    pub fn signer(&self) -> GatewayResult<&BoundSigner> {
        match &self.state {
            SessionState::Connected { bound, .. } => Ok(bound),
            SessionState::Disconnected => Err(GatewayError::NoWalletConnected),
        }
    }

    /// Public details of the connected wallet.
    pub fn info(&self) -> GatewayResult<WalletInfo> {
        let SessionState::Connected { key, bound } = &self.state else {
            return Err(GatewayError::NoWalletConnected);
        };
        let public_key = key
            .signer
            .credential()
            .verifying_key()
            .to_encoded_point(false);
        Ok(WalletInfo {
            address: bound.address(),
            source: key.source,
            derivation_path: key.derivation_path.clone(),
            public_key: hex::encode_prefixed(public_key.as_bytes()),
        })
    }

    /// Returns whether anything was held.
    fn discard(&mut self) -> bool {
        let was_connected = self.can_sign();
        self.state = SessionState::Disconnected;
        was_connected
    }

    async fn establish(
        &mut self,
        key: KeyMaterial,
        network: Arc<NetworkDescriptor>,
        pool: &EndpointPool,
    ) -> GatewayResult<ConnectionInfo> {
        let (bound, info) = self.bind(&key.signer, network, pool).await?;
        tracing::info!(
            address = %info.address,
            network = %info.network,
            chain_id = info.chain_id,
            source = ?key.source,
            "Wallet connected"
        );
        self.state = SessionState::Connected { key, bound };
        Ok(info)
    }

    async fn bind(
        &self,
        signer: &PrivateKeySigner,
        network: Arc<NetworkDescriptor>,
        pool: &EndpointPool,
    ) -> GatewayResult<(BoundSigner, ConnectionInfo)> {
        let descriptor: &NetworkDescriptor = &network;
        let observed = with_retry(&self.retry, "eth_chainId", move || pool.chain_id(descriptor))
            .await
            .map_err(|e| match e {
                GatewayError::UnsupportedNetwork(_) => e,
                other => GatewayError::ConnectionFailed(format!("{}: {}", network.key, other)),
            })?;

        let expected = network.chain_id.0;
        let chain_mismatch = (observed != expected).then_some(ChainIdMismatch {
            expected,
            actual: observed,
        });
        if chain_mismatch.is_some() {
            if self.settings.strict_chain_id {
                return Err(GatewayError::ChainMismatch {
                    expected,
                    actual: observed,
                });
            }
            tracing::warn!(
                network = %network.key,
                expected,
                actual = observed,
                "Chain ID mismatch, continuing with the reported chain"
            );
        }

        let bound = BoundSigner::bind(signer.clone(), network, observed);
        let info = ConnectionInfo {
            address: bound.address(),
            chain_id: observed,
            network: bound.network().key.clone(),
            can_sign: true,
            chain_mismatch,
        };
        Ok((bound, info))
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("address", &self.address())
            .field("can_sign", &self.can_sign())
            .finish_non_exhaustive()
    }
}
