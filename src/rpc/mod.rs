//! RPC endpoint pool subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkRegistry ([primary, ...backups] per network)
//!     → endpoint.rs (URL parsing, provider handles)
//!     → pool.rs (ordered failover, per-attempt timeout, fixed delay)
//!     → typed helpers used by wallet, tokens, balances, history, transactions
//! ```
//!
//! # Design Decisions
//! - No health memory between calls: each request starts at the primary
//! - Reverts are answered identically by every node, so they short-circuit
//! - Providers are created once at startup and shared behind an `Arc`

pub mod endpoint;
pub mod pool;

pub use endpoint::{Endpoint, EndpointHealth};
pub use pool::EndpointPool;
