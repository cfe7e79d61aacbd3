//! Transaction subsystem.
//!
//! # Data Flow
//! ```text
//! TxRequest (to, value, data, optional gas limit)
//!     → builder.rs: nonce (pending), gas price × multiplier, gas estimate
//!     → BoundSigner signs the legacy EIP-155 transaction once
//!     → EndpointPool::send_raw_transaction (failover with identical bytes)
//!     → SentTransaction; optional wait_for_confirmation polling
//! ```
//!
//! # Security Constraints
//! - Gas price above `max_gas_price_gwei` is refused before signing
//! - Only the signer's bound network is ever used for broadcast

pub mod builder;
pub mod types;

pub use builder::TxBuilder;
pub use types::{ConfirmationStatus, SentTransaction, TxRequest};
