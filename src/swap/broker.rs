//! Swap quoting and execution.
//!
//! # Responsibilities
//! - Quote swaps through the aggregator
//! - Approve the aggregator router for exactly the input amount when needed
//! - Fetch, sanity-check, sign and broadcast the swap transaction

use std::time::{Duration, Instant};

use alloy::primitives::{Address, TxHash, U256};

use crate::config::AggregatorConfig;
use crate::error::{GatewayError, GatewayResult, InputKind};
use crate::network::{NetworkDescriptor, NATIVE_TOKEN_ADDRESS};
use crate::rpc::EndpointPool;
use crate::swap::aggregator::{self, AggregatorClient, NATIVE_SENTINEL};
use crate::swap::types::{Allowance, SwapExecution, SwapQuote, SwapRequest};
use crate::tokens::erc20;
use crate::transactions::{ConfirmationStatus, TxBuilder, TxRequest};
use crate::units;
use crate::wallet::BoundSigner;

/// Largest accepted slippage, in percent.
pub const MAX_SLIPPAGE_PERCENT: f64 = 50.0;

/// Swap broker over the aggregator API.
#[derive(Debug, Clone)]
pub struct SwapBroker {
    client: AggregatorClient,
    pool: EndpointPool,
    tx_builder: TxBuilder,
    quote_ttl: Duration,
}

impl SwapBroker {
    pub fn new(config: &AggregatorConfig, pool: EndpointPool, tx_builder: TxBuilder) -> GatewayResult<Self> {
        Ok(Self {
            client: AggregatorClient::new(config)?,
            pool,
            tx_builder,
            quote_ttl: Duration::from_secs(config.quote_ttl_secs),
        })
    }

    /// Quote `request` on `network`. No wallet required.
    pub async fn quote(&self, request: &SwapRequest, network: &NetworkDescriptor) -> GatewayResult<SwapQuote> {
        let chain_id = supported_chain(network)?;
        let amount_in_raw = units::parse_amount(&request.amount, request.decimals)?;

        let response = self
            .client
            .quote(chain_id, request.from_token, request.to_token, amount_in_raw)
            .await?;

        tracing::debug!(
            network = %network.key,
            from_token = %request.from_token,
            to_token = %request.to_token,
            amount_in = %amount_in_raw,
            amount_out = %response.to_amount,
            "Swap quoted"
        );

        Ok(SwapQuote {
            request: request.clone(),
            network: network.key.clone(),
            amount_in_raw,
            output_amount_raw: response.to_amount,
            estimated_gas: response.estimated_gas.unwrap_or_default(),
            route: aggregator::route_names(&response.protocols),
            obtained_at: Instant::now(),
        })
    }

    /// Execute a swap on the signer's network. Returns without waiting for inclusion.
    ///
    /// An ERC-20 input is first approved for exactly the swap amount, and the
    /// approval is awaited; any approval failure aborts before the swap.
    pub async fn execute(
        &self,
        request: &SwapRequest,
        slippage: f64,
        signer: &BoundSigner,
    ) -> GatewayResult<TxHash> {
        validate_slippage(slippage)?;
        let network = signer.network();
        let chain_id = supported_chain(network)?;
        let amount = units::parse_amount(&request.amount, request.decimals)?;
        let is_native_input = request.from_token == NATIVE_TOKEN_ADDRESS || request.from_token == NATIVE_SENTINEL;

        if !is_native_input {
            self.ensure_allowance(request.from_token, amount, signer).await?;
        }

        let response = self
            .client
            .swap(chain_id, request.from_token, request.to_token, amount, signer.address(), slippage)
            .await?;

        let tx = response.tx;
        if tx.to != network.aggregator_router {
            return Err(GatewayError::SwapExecutionFailed(format!(
                "unexpected router {}",
                tx.to
            )));
        }
        if tx.data.is_empty() {
            return Err(GatewayError::SwapExecutionFailed("empty swap calldata".into()));
        }
        if is_native_input && tx.value != amount {
            return Err(GatewayError::SwapExecutionFailed(format!(
                "unexpected value {} for native swap of {amount}",
                tx.value
            )));
        }
        if !is_native_input && !tx.value.is_zero() {
            return Err(GatewayError::SwapExecutionFailed(format!(
                "unexpected non-zero value {}",
                tx.value
            )));
        }

        let sent = self
            .tx_builder
            .send(
                signer,
                TxRequest {
                    to: tx.to,
                    value: tx.value,
                    data: tx.data,
                    gas_limit: tx.gas,
                },
            )
            .await
            .map_err(|e| GatewayError::SwapExecutionFailed(format!("swap broadcast failed: {e}")))?;

        tracing::info!(
            network = %network.key,
            tx_hash = %sent.hash,
            from_token = %request.from_token,
            to_token = %request.to_token,
            expected_out = ?response.to_amount,
            "Swap broadcast"
        );
        Ok(sent.hash)
    }

    /// Execute a previously obtained quote.
    ///
    /// Re-quotes first when the quote is older than the configured TTL or was
    /// made for a different network than the signer's.
    pub async fn execute_quote(
        &self,
        quote: &SwapQuote,
        slippage: f64,
        signer: &BoundSigner,
    ) -> GatewayResult<SwapExecution> {
        validate_slippage(slippage)?;
        let network = signer.network();

        let requoted = !quote.is_usable(self.quote_ttl, &network.key);
        let quote = if requoted {
            tracing::info!(
                network = %network.key,
                quoted_on = %quote.network,
                age_ms = quote.obtained_at.elapsed().as_millis() as u64,
                "Quote stale, re-quoting"
            );
            self.quote(&quote.request, network).await?
        } else {
            quote.clone()
        };

        let tx_hash = self.execute(&quote.request, slippage, signer).await?;
        Ok(SwapExecution {
            tx_hash,
            explorer_url: network.explorer_tx_url(&tx_hash.to_string()),
            quote,
            requoted,
        })
    }

    async fn ensure_allowance(&self, token: Address, amount: U256, signer: &BoundSigner) -> GatewayResult<()> {
        let network = signer.network();
        let spender = network.aggregator_router;

        let current = erc20::allowance(&self.pool, network, token, signer.address(), spender)
            .await
            .map_err(|e| GatewayError::SwapExecutionFailed(format!("allowance check failed: {e}")))?;

        let Allowance::NeedsApproval { current } = Allowance::check(current, amount) else {
            return Ok(());
        };

        tracing::info!(
            network = %network.key,
            token = %token,
            spender = %spender,
            current = %current,
            required = %amount,
            "Approving aggregator router"
        );

        let approval = self
            .tx_builder
            .approve(signer, token, spender, amount)
            .await
            .map_err(|e| GatewayError::SwapExecutionFailed(format!("approval failed: {e}")))?;

        match self.tx_builder.wait_for_confirmation(network, approval.hash).await {
            Ok(ConfirmationStatus::Confirmed { block_number }) => {
                tracing::debug!(tx_hash = %approval.hash, block_number, "Approval confirmed");
                Ok(())
            }
            Ok(status) => Err(GatewayError::SwapExecutionFailed(format!(
                "approval {} not confirmed: {status:?}",
                approval.hash
            ))),
            Err(e) => Err(GatewayError::SwapExecutionFailed(format!(
                "approval {} failed: {e}",
                approval.hash
            ))),
        }
    }
}

fn supported_chain(network: &NetworkDescriptor) -> GatewayResult<u64> {
    aggregator::aggregator_chain_id(network.chain_id.0)
        .ok_or_else(|| GatewayError::UnsupportedNetwork(network.key.clone()))
}

fn validate_slippage(slippage: f64) -> GatewayResult<()> {
    if !slippage.is_finite() || slippage <= 0.0 || slippage > MAX_SLIPPAGE_PERCENT {
        return Err(GatewayError::invalid(
            InputKind::Slippage,
            format!("expected a percentage in (0, {MAX_SLIPPAGE_PERCENT}], got {slippage}"),
        ));
    }
    Ok(())
}
