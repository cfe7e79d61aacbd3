//! Swap broker subsystem.
//!
//! # Data Flow
//! ```text
//! SwapRequest (from, to, decimal amount, decimals)
//!     → broker.rs: chain id → aggregator chain, amount → smallest unit
//!     → aggregator.rs: GET {base}/{chain}/quote | /swap (native → 0xEeee… sentinel)
//!     → ERC-20 input: allowance check, exact approve, wait for confirmation
//!     → transactions::TxBuilder signs and broadcasts the swap transaction
//! ```
//!
//! # Design Decisions
//! - Quotes carry their age; stale quotes are re-quoted before execution
//! - The aggregator's transaction target must be the network's router
//! - Swap broadcast is fire-and-forget; only approvals are awaited

pub mod aggregator;
pub mod broker;
pub mod types;

pub use aggregator::{AggregatorClient, NATIVE_SENTINEL};
pub use broker::SwapBroker;
pub use types::{SwapExecution, SwapQuote, SwapRequest};
