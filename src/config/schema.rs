//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the chain gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Network selected at startup (registry key, e.g. "ethereum").
    pub default_network: DefaultNetwork,

    /// RPC transport settings shared by every endpoint pool.
    pub rpc: RpcConfig,

    /// Whole-operation retry policy (connect, switch network).
    pub retry: RetryConfig,

    /// Wallet session settings.
    pub wallet: WalletConfig,

    /// Transaction building settings.
    pub transactions: TransactionConfig,

    /// History scanner bounds.
    pub history: HistoryConfig,

    /// Swap aggregator settings.
    pub aggregator: AggregatorConfig,

    /// Custom-token persistence.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Per-network endpoint overrides, keyed by registry key.
    pub networks: BTreeMap<String, NetworkOverride>,
}

/// Newtype so the default network has a serde default.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DefaultNetwork(pub String);

impl Default for DefaultNetwork {
    fn default() -> Self {
        Self("ethereum".to_string())
    }
}

/// RPC transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,

    /// Fixed delay between endpoint attempts in milliseconds.
    pub failover_delay_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            failover_delay_ms: 1000,
        }
    }
}

/// Delay shape between whole-operation retries.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts (including the first).
    pub max_attempts: u32,

    /// Base delay between attempts in milliseconds.
    pub base_delay_ms: u64,

    /// Cap for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Fixed or exponential backoff.
    pub backoff: BackoffKind,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
            backoff: BackoffKind::Fixed,
        }
    }
}

/// Wallet session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// BIP-32 path used for mnemonic derivation.
    pub derivation_path: String,

    /// Fail the connection when the live chain id differs from the registry.
    pub strict_chain_id: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            derivation_path: "m/44'/60'/0'/0/0".to_string(),
            strict_chain_id: false,
        }
    }
}

/// Transaction building configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas price multiplier (1.0 = node estimate, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,

    /// Number of block confirmations required when waiting.
    pub confirmation_blocks: u32,

    /// Maximum time to wait for a confirmation in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 180,
            poll_interval_ms: 2000,
        }
    }
}

/// History scanner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// How far behind the tip the scan may reach.
    pub max_lookback_blocks: u64,

    /// How many blocks are actually fetched per request.
    pub max_blocks_scanned: u64,

    /// Record limit when the caller does not pass one.
    pub default_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_lookback_blocks: 1000,
            max_blocks_scanned: 100,
            default_limit: 20,
        }
    }
}

/// Swap aggregator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Base URL; the chain id is appended as a path segment.
    pub base_url: String,

    /// Optional bearer token.
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,

    /// How long a quote stays executable without re-quoting.
    pub quote_ttl_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.1inch.dev/swap/v5.2".to_string(),
            api_key: None,
            timeout_secs: 20,
            quote_ttl_secs: 30,
        }
    }
}

/// Custom-token persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding custom tokens; in-memory when unset.
    pub custom_tokens_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "chain_gateway=info".to_string(),
            json_logs: false,
        }
    }
}

/// Endpoint override for one built-in network.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NetworkOverride {
    /// Replaces the primary endpoint.
    pub rpc_url: Option<String>,

    /// Replaces the backup list when present.
    pub backup_urls: Option<Vec<String>>,
}
