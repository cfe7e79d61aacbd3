//! Balance queries across a token set.

use alloy::primitives::{Address, U256};
use futures_util::future::join_all;
use serde::Serialize;

use crate::error::GatewayResult;
use crate::network::{NetworkDescriptor, TokenDescriptor};
use crate::rpc::EndpointPool;
use crate::tokens::{erc20, TokenRegistry};
use crate::units::{self, DISPLAY_DECIMALS};

/// One token's balance for one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub token: TokenDescriptor,
    pub raw_balance: U256,
    pub decimals: u8,
    /// Exact decimal value.
    pub balance: String,
    /// Rounded to six decimals for display.
    pub formatted_balance: String,
}

impl BalanceSnapshot {
    fn new(token: TokenDescriptor, raw_balance: U256, decimals: u8) -> Self {
        Self {
            balance: units::format_amount(raw_balance, decimals),
            formatted_balance: units::format_display(raw_balance, decimals, DISPLAY_DECIMALS),
            token,
            raw_balance,
            decimals,
        }
    }

    fn zero(token: TokenDescriptor) -> Self {
        let decimals = token.decimals;
        Self::new(token, U256::ZERO, decimals)
    }

    pub fn is_zero(&self) -> bool {
        self.raw_balance.is_zero()
    }
}

/// Reads native and ERC-20 balances through the endpoint pool.
#[derive(Debug, Clone)]
pub struct BalanceAggregator {
    pool: EndpointPool,
}

impl BalanceAggregator {
    pub fn new(pool: EndpointPool) -> Self {
        Self { pool }
    }

    /// Native balance of `address`.
    pub async fn native_balance(
        &self,
        address: Address,
        network: &NetworkDescriptor,
    ) -> GatewayResult<BalanceSnapshot> {
        let raw = self.pool.balance(network, address).await?;
        let token = network.native_descriptor();
        let decimals = token.decimals;
        Ok(BalanceSnapshot::new(token, raw, decimals))
    }

    /// Balance of one token; the native pseudo-token delegates to the native query.
    ///
    /// Decimals are read from the contract, not taken from the descriptor.
    pub async fn token_balance(
        &self,
        token: &TokenDescriptor,
        wallet: Address,
        network: &NetworkDescriptor,
    ) -> GatewayResult<BalanceSnapshot> {
        if token.is_native() {
            let mut snapshot = self.native_balance(wallet, network).await?;
            snapshot.token = token.clone();
            return Ok(snapshot);
        }

        let (raw, decimals) = futures_util::try_join!(
            erc20::balance_of(&self.pool, network, token.address, wallet),
            erc20::decimals(&self.pool, network, token.address),
        )?;
        Ok(BalanceSnapshot::new(token.clone(), raw, decimals))
    }

    /// Balances for every token the registry lists on `network`.
    ///
    /// Never fails per token: a failed query becomes a zero entry.
    pub async fn all_balances(
        &self,
        wallet: Address,
        network: &NetworkDescriptor,
        registry: &TokenRegistry,
    ) -> GatewayResult<Vec<BalanceSnapshot>> {
        let tokens = registry.all_tokens(network)?;
        let queries = tokens.into_values().map(|token| async move {
            match self.token_balance(&token, wallet, network).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(
                        network = %network.key,
                        token = %token.symbol,
                        address = %token.address,
                        error = %e,
                        "Balance query failed, reporting zero"
                    );
                    BalanceSnapshot::zero(token)
                }
            }
        });
        Ok(join_all(queries).await)
    }
}
