//! Network and token descriptors.

use std::collections::BTreeMap;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Pseudo-address standing for a network's native token.
pub const NATIVE_TOKEN_ADDRESS: Address = Address::ZERO;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Native currency of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeToken {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
}

/// An ERC-20 token (or the native pseudo-token) on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Contract address; [`NATIVE_TOKEN_ADDRESS`] for the native token.
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Added by the user rather than shipped in the network table.
    #[serde(default)]
    pub is_custom: bool,
    /// Registry key of the owning network.
    pub network: String,
}

impl TokenDescriptor {
    /// Whether this is the native pseudo-token.
    pub fn is_native(&self) -> bool {
        self.address == NATIVE_TOKEN_ADDRESS
    }

    /// Case-insensitive address match.
    ///
    /// `Address` equality is byte equality, so checksum casing never matters.
    pub fn has_address(&self, address: &Address) -> bool {
        self.address == *address
    }
}

/// Immutable description of one supported network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDescriptor {
    /// Registry key (e.g. "ethereum").
    pub key: String,
    pub chain_id: ChainId,
    pub name: String,
    pub primary_endpoint: String,
    /// Ordered failover endpoints.
    pub backup_endpoints: Vec<String>,
    pub native_token: NativeToken,
    /// Shipped tokens keyed by symbol, including the native pseudo-token.
    pub known_tokens: BTreeMap<String, TokenDescriptor>,
    /// DEX router.
    pub router_address: Address,
    /// DEX quoter.
    pub quoter_address: Address,
    /// Spender approved before aggregator swaps.
    pub aggregator_router: Address,
    pub multicall_address: Address,
    pub explorer_url: String,
    pub average_block_time_secs: u64,
}

impl NetworkDescriptor {
    /// `[primary, ...backups]` in failover order.
    pub fn endpoints(&self) -> Vec<String> {
        std::iter::once(self.primary_endpoint.clone())
            .chain(self.backup_endpoints.iter().cloned())
            .collect()
    }

    /// Descriptor of the native pseudo-token.
    pub fn native_descriptor(&self) -> TokenDescriptor {
        TokenDescriptor {
            address: NATIVE_TOKEN_ADDRESS,
            symbol: self.native_token.symbol.clone(),
            name: self.native_token.name.clone(),
            decimals: self.native_token.decimals,
            is_custom: false,
            network: self.key.clone(),
        }
    }

    /// Explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}
