//! Balance aggregation subsystem.
//!
//! # Data Flow
//! ```text
//! TokenRegistry::all_tokens(network)
//!     → aggregator.rs (one query per token, fanned out with join_all)
//!         native  → eth_getBalance
//!         ERC-20  → balanceOf + decimals
//!     → Vec<BalanceSnapshot> (failures become zero entries)
//! ```
//!
//! # Design Decisions
//! - Snapshots are recomputed wholesale; nothing is cached
//! - One bad token contract cannot hide the rest of the portfolio

pub mod aggregator;

pub use aggregator::{BalanceAggregator, BalanceSnapshot};
