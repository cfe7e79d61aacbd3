//! ERC-20 contract validation.
//!
//! # Responsibilities
//! - Parse and checksum-check caller supplied addresses
//! - Reject addresses without deployed code
//! - Probe token metadata, tolerating individual probe failures

use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::error::{GatewayError, GatewayResult, InputKind};
use crate::network::NetworkDescriptor;
use crate::rpc::EndpointPool;
use crate::tokens::erc20;
use crate::units;

/// Default decimals assumed when a contract does not answer `decimals()`.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Metadata read from a contract that looks like an ERC-20 token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedToken {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub total_supply_raw: U256,
    /// Total supply formatted with the discovered decimals.
    pub total_supply: String,
}

/// Outcome of validating a contract address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenValidation {
    Valid(ValidatedToken),
    Invalid { address: Address, reason: String },
}

impl TokenValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, TokenValidation::Valid(_))
    }
}

/// Parse a 0x-prefixed address.
///
/// All-lowercase and all-uppercase input is accepted as is; mixed case must
/// carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> GatewayResult<Address> {
    let trimmed = input.trim();
    let Some(hex_part) = trimmed.strip_prefix("0x") else {
        return Err(GatewayError::invalid(InputKind::Address, "missing 0x prefix"));
    };
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(GatewayError::invalid(
            InputKind::Address,
            "expected 40 hex digits after 0x",
        ));
    }

    let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(trimmed, None)
            .map_err(|_| GatewayError::invalid(InputKind::Address, "bad EIP-55 checksum"));
    }
    Address::from_str(trimmed).map_err(|e| GatewayError::invalid(InputKind::Address, e.to_string()))
}

/// Validate that `address` hosts an ERC-20 token on `network`.
///
/// Fails with `NoContractAtAddress` when no code is deployed there.
/// Metadata probes run concurrently; a failed probe yields its default
/// ("" for strings, 18 decimals, zero supply).
pub async fn validate(
    pool: &EndpointPool,
    network: &NetworkDescriptor,
    address: &str,
) -> GatewayResult<TokenValidation> {
    let address = parse_address(address)?;

    let code = pool.code(network, address).await?;
    if code.is_empty() {
        return Err(GatewayError::NoContractAtAddress(address));
    }

    let (symbol, name, decimals, total_supply) = tokio::join!(
        erc20::symbol(pool, network, address),
        erc20::name(pool, network, address),
        erc20::decimals(pool, network, address),
        erc20::total_supply(pool, network, address),
    );

    let symbol = probe_or_default(symbol, address, "symbol", String::new());
    let name = probe_or_default(name, address, "name", String::new());
    let decimals = probe_or_default(decimals, address, "decimals", DEFAULT_DECIMALS);
    let total_supply_raw = probe_or_default(total_supply, address, "totalSupply", U256::ZERO);

    if symbol.is_empty() && name.is_empty() {
        tracing::info!(network = %network.key, token = %address, "Contract exposes no token metadata");
        return Ok(TokenValidation::Invalid {
            address,
            reason: "contract exposes neither symbol nor name".to_string(),
        });
    }

    Ok(TokenValidation::Valid(ValidatedToken {
        address,
        symbol,
        name,
        decimals,
        total_supply_raw,
        total_supply: units::format_amount(total_supply_raw, decimals),
    }))
}

fn probe_or_default<T>(result: GatewayResult<T>, token: Address, probe: &str, default: T) -> T {
    result.unwrap_or_else(|e| {
        tracing::debug!(token = %token, probe, error = %e, "Token probe failed, using default");
        default
    })
}
