//! Signer bound to one network.

use std::sync::Arc;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, Signer, SignerSync};

use crate::error::{GatewayError, GatewayResult};
use crate::network::NetworkDescriptor;

/// Key material bound to a network for EIP-155 signing.
///
/// Rebuilt from the session's key on every network switch.
#[derive(Clone)]
pub struct BoundSigner {
    signer: PrivateKeySigner,
    network: Arc<NetworkDescriptor>,
    /// Chain id reported by the network during the handshake.
    chain_id: u64,
}

impl BoundSigner {
    pub(crate) fn bind(signer: PrivateKeySigner, network: Arc<NetworkDescriptor>, chain_id: u64) -> Self {
        let signer = signer.with_chain_id(Some(chain_id));
        Self {
            signer,
            network,
            chain_id,
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn network(&self) -> &Arc<NetworkDescriptor> {
        &self.network
    }

    /// Chain id used for replay protection.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a 32-byte digest.
    pub fn sign_hash(&self, hash: &B256) -> GatewayResult<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| GatewayError::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for BoundSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundSigner")
            .field("address", &self.address())
            .field("network", &self.network.key)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkRegistry;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn bound() -> BoundSigner {
        let signer: PrivateKeySigner = TEST_PRIVATE_KEY.parse().unwrap();
        let network = NetworkRegistry::builtin().get("optimism").unwrap();
        BoundSigner::bind(signer, network, 10)
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", bound());
        assert!(debug.contains("optimism"));
        assert!(!debug.contains(TEST_PRIVATE_KEY));
    }

    #[test]
    fn test_sign_hash() {
        let signer = bound();
        let digest = alloy::primitives::keccak256(b"Hello, World!");
        let signature = signer.sign_hash(&digest).unwrap();
        assert_eq!(signature.as_bytes().len(), 65);
        assert_eq!(
            signature.recover_address_from_prehash(&digest).unwrap(),
            signer.address()
        );
    }
}
