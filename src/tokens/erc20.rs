//! ERC-20 contract reads and calldata.
//!
//! Encodes the standard ABI calls and dispatches them through the endpoint pool.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::error::{GatewayError, GatewayResult};
use crate::network::NetworkDescriptor;
use crate::rpc::EndpointPool;

/// Minimal ERC-20 ABI fragments.
pub(crate) mod abi {
    alloy::sol! {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

async fn read<C: SolCall>(
    pool: &EndpointPool,
    network: &NetworkDescriptor,
    token: Address,
    call: C,
) -> GatewayResult<C::Return> {
    let output = pool
        .eth_call(network, token, Bytes::from(call.abi_encode()))
        .await?;
    C::abi_decode_returns(&output).map_err(|e| {
        tracing::debug!(token = %token, function = C::SIGNATURE, error = %e, "ERC-20 decode failed");
        GatewayError::InvalidTokenContract(token)
    })
}

pub async fn name(pool: &EndpointPool, network: &NetworkDescriptor, token: Address) -> GatewayResult<String> {
    read(pool, network, token, abi::nameCall {}).await
}

pub async fn symbol(pool: &EndpointPool, network: &NetworkDescriptor, token: Address) -> GatewayResult<String> {
    read(pool, network, token, abi::symbolCall {}).await
}

pub async fn decimals(pool: &EndpointPool, network: &NetworkDescriptor, token: Address) -> GatewayResult<u8> {
    read(pool, network, token, abi::decimalsCall {}).await
}

pub async fn total_supply(
    pool: &EndpointPool,
    network: &NetworkDescriptor,
    token: Address,
) -> GatewayResult<U256> {
    read(pool, network, token, abi::totalSupplyCall {}).await
}

/// Raw token balance of `owner` (not adjusted for decimals).
pub async fn balance_of(
    pool: &EndpointPool,
    network: &NetworkDescriptor,
    token: Address,
    owner: Address,
) -> GatewayResult<U256> {
    read(pool, network, token, abi::balanceOfCall { owner }).await
}

pub async fn allowance(
    pool: &EndpointPool,
    network: &NetworkDescriptor,
    token: Address,
    owner: Address,
    spender: Address,
) -> GatewayResult<U256> {
    read(pool, network, token, abi::allowanceCall { owner, spender }).await
}

/// Calldata for `transfer(to, amount)`.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    Bytes::from(abi::transferCall { to, amount }.abi_encode())
}

/// Calldata for `approve(spender, amount)`.
pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    Bytes::from(abi::approveCall { spender, amount }.abi_encode())
}
