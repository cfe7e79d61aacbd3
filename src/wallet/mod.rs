//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! Mnemonic or hex key (caller / environment)
//!     → credentials.rs (local validation, key derivation)
//!     → session.rs (eth_chainId handshake through the endpoint pool)
//!     → signer.rs (signer bound to the network's chain id)
//!     → transactions / swap (signing)
//! ```
//!
//! # Security Constraints
//! - Never log private keys, phrases or any derived secret
//! - Malformed input is rejected before any network traffic
//! - A new connect discards the previous key before validating the new one
//! - Disconnect drops the key material; signing keys zeroize on drop

pub mod credentials;
pub mod session;
pub mod signer;

pub use credentials::{KeySource, MNEMONIC_ENV_VAR, PRIVATE_KEY_ENV_VAR};
pub use session::{ChainIdMismatch, ConnectionInfo, WalletInfo, WalletSession};
pub use signer::BoundSigner;
