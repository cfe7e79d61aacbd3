//! Key material parsing.
//!
//! # Security
//! - Input is validated locally before any network call
//! - The normalized phrase lives in a `Zeroizing` buffer
//! - Parsed signing keys zeroize on drop (`k256::SigningKey`)
//! - Errors never echo the rejected secret

use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::{GatewayError, GatewayResult, InputKind};

/// Environment variable read by the CLI for a mnemonic phrase.
pub const MNEMONIC_ENV_VAR: &str = "CHAIN_GATEWAY_MNEMONIC";

/// Environment variable read by the CLI for a raw private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "CHAIN_GATEWAY_PRIVATE_KEY";

/// Where the session's key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    Mnemonic,
    PrivateKey,
}

/// Trim, lowercase and collapse whitespace; accept 12 or 24 words only.
pub fn normalize_mnemonic(phrase: &str) -> GatewayResult<Zeroizing<String>> {
    let normalized = Zeroizing::new(
        phrase
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    );
    let words = normalized.split(' ').filter(|w| !w.is_empty()).count();
    if words != 12 && words != 24 {
        return Err(GatewayError::invalid(
            InputKind::Mnemonic,
            format!("expected 12 or 24 words, got {words}"),
        ));
    }
    Ok(normalized)
}

/// Derive the signer at `derivation_path` from a BIP-39 phrase.
pub fn signer_from_mnemonic(phrase: &str, derivation_path: &str) -> GatewayResult<PrivateKeySigner> {
    let normalized = normalize_mnemonic(phrase)?;
    MnemonicBuilder::<English>::default()
        .phrase(normalized.as_str())
        .derivation_path(derivation_path)
        .map_err(|e| {
            GatewayError::invalid(InputKind::Mnemonic, format!("invalid derivation path: {e}"))
        })?
        .build()
        .map_err(|_| GatewayError::invalid(InputKind::Mnemonic, "not a valid BIP-39 phrase"))
}

/// Check the `(0x)?[0-9a-fA-F]{64}` shape and return the bare hex.
pub fn validate_private_key(private_key_hex: &str) -> GatewayResult<&str> {
    let trimmed = private_key_hex.trim();
    let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if key_hex.len() != 64 {
        return Err(GatewayError::invalid(
            InputKind::PrivateKey,
            format!("expected 64 hex digits, got {}", key_hex.len()),
        ));
    }
    if !key_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(GatewayError::invalid(
            InputKind::PrivateKey,
            "contains non-hex characters",
        ));
    }
    Ok(key_hex)
}

/// Parse a hex private key (with or without 0x prefix).
pub fn signer_from_private_key(private_key_hex: &str) -> GatewayResult<PrivateKeySigner> {
    let key_hex = validate_private_key(private_key_hex)?;
    key_hex.parse::<PrivateKeySigner>().map_err(|_| {
        GatewayError::invalid(InputKind::PrivateKey, "not a valid secp256k1 scalar")
    })
}
