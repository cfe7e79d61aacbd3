//! Transaction history subsystem.
//!
//! # Data Flow
//! ```text
//! eth_blockNumber (tip)
//!     → scanner.rs walks back: at most max_lookback_blocks behind the tip,
//!       at most max_blocks_scanned blocks fetched
//!     → source.rs (BlockSource: full blocks and receipts via the endpoint pool)
//!     → Vec<TransactionRecord>, newest first
//! ```
//!
//! # Design Decisions
//! - No indexer: history is whatever the recent block window contains
//! - The block source is a trait so the scan can be exercised without a node

pub mod scanner;
pub mod source;

pub use scanner::{Direction, HistoryScanner, TransactionRecord, TxStatus};
pub use source::{BlockSource, NetworkBlockSource, ScannedBlock, ScannedReceipt, ScannedTransaction};
