//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to Gateway::new, which splits it per subsystem
//! ```
//!
//! # Design Decisions
//! - An empty file is a working config: built-in endpoints, ethereum selected
//! - Endpoint overrides patch the built-in network table, they never add networks
//! - No credentials in config; keys come from the caller or the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AggregatorConfig, BackoffKind, GatewayConfig, HistoryConfig, NetworkOverride,
    ObservabilityConfig, RetryConfig, RpcConfig, StorageConfig, TransactionConfig, WalletConfig,
};
