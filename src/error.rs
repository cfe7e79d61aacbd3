//! Gateway error taxonomy.

use std::fmt;

use alloy::primitives::Address;
use thiserror::Error;

/// Which piece of caller input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Mnemonic,
    PrivateKey,
    Address,
    Amount,
    Slippage,
    Network,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Mnemonic => "mnemonic",
            InputKind::PrivateKey => "private key",
            InputKind::Address => "address",
            InputKind::Amount => "amount",
            InputKind::Slippage => "slippage",
            InputKind::Network => "network",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed caller input. Never retried.
    #[error("Invalid {kind}: {reason}")]
    InvalidInput { kind: InputKind, reason: String },

    /// A signing operation was requested without key material.
    #[error("No wallet connected")]
    NoWalletConnected,

    /// Network key is unknown or the aggregator does not serve its chain.
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// Every endpoint of the network failed for one logical request.
    #[error("All {attempts} RPC endpoints unavailable for {network}")]
    AllEndpointsUnavailable { network: String, attempts: usize },

    /// Wallet handshake with the network failed after retries.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// `eth_getCode` returned empty bytecode.
    #[error("No contract found at {0}")]
    NoContractAtAddress(Address),

    /// Contract does not behave like an ERC-20 token.
    #[error("Invalid token contract at {0}")]
    InvalidTokenContract(Address),

    #[error("Swap quote failed: {0}")]
    QuoteFailed(String),

    #[error("Swap execution failed: {0}")]
    SwapExecutionFailed(String),

    /// The node refused the transaction (bad nonce, insufficient funds, ...).
    #[error("Rejected by node: {0}")]
    Rejected(String),

    /// The node executed the call and it reverted.
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// Transaction was not confirmed within expected time.
    #[error("Transaction not confirmed after {0} seconds")]
    ConfirmationTimeout(u64),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch (only raised in strict mode).
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Signing or transaction encoding failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Custom-token persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl GatewayError {
    pub(crate) fn invalid(kind: InputKind, reason: impl Into<String>) -> Self {
        GatewayError::InvalidInput {
            kind,
            reason: reason.into(),
        }
    }

    /// True for the malformed-input family.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, GatewayError::InvalidInput { .. })
    }

    /// Whether repeating the whole operation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::AllEndpointsUnavailable { .. } | GatewayError::ConnectionFailed(_)
        )
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
