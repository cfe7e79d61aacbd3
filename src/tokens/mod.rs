//! Token registry and validator subsystem.
//!
//! # Data Flow
//! ```text
//! Caller supplied address
//!     → validator.rs (address parsing, eth_getCode, concurrent metadata probes)
//!     → registry.rs (upsert / remove custom tokens, overlay on built-ins)
//!     → store.rs (TokenStore: memory or JSON file, key custom_tokens_<network>)
//!
//! erc20.rs: ABI encoding shared with balances, transactions and swap
//! ```
//!
//! # Design Decisions
//! - Token identity is the address; symbols are display keys only
//! - Metadata probes never fail validation on their own; defaults apply

pub mod erc20;
pub mod registry;
pub mod store;
pub mod validator;

pub use registry::TokenRegistry;
pub use store::{storage_key, CustomToken, FileTokenStore, MemoryTokenStore, TokenStore};
pub use validator::{parse_address, TokenValidation, ValidatedToken};
