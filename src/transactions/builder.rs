//! Transaction building, signing, and confirmation monitoring.
//!
//! # Responsibilities
//! - Fill nonce, gas price and gas limit from the chain
//! - Enforce the gas price ceiling
//! - Sign once locally and broadcast the raw bytes through the endpoint pool
//! - Monitor confirmations

use std::time::Duration;

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::rpc::types::TransactionRequest;
use tokio::time::{interval, timeout};

use crate::config::TransactionConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::network::NetworkDescriptor;
use crate::rpc::EndpointPool;
use crate::tokens::erc20;
use crate::transactions::types::{ConfirmationStatus, SentTransaction, TxRequest};
use crate::units;
use crate::wallet::BoundSigner;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Headroom added to node gas estimates, in percent.
const GAS_LIMIT_BUFFER_PERCENT: u64 = 20;

/// Transaction builder for common operations.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    pool: EndpointPool,
    config: TransactionConfig,
}

impl TxBuilder {
    pub fn new(pool: EndpointPool, config: TransactionConfig) -> Self {
        Self { pool, config }
    }

    /// Node gas estimate for `request` sent from the signer.
    pub async fn estimate_gas(&self, signer: &BoundSigner, request: &TxRequest) -> GatewayResult<u64> {
        let tx = TransactionRequest::default()
            .with_from(signer.address())
            .with_to(request.to)
            .with_value(request.value)
            .with_input(request.data.clone());
        self.pool.estimate_gas(signer.network(), tx).await
    }

    /// Node gas price with the multiplier applied.
    ///
    /// Fails with `GasPriceTooHigh` when the node price exceeds the ceiling.
    pub async fn gas_price(&self, network: &NetworkDescriptor) -> GatewayResult<u128> {
        let gas_price = self.pool.gas_price(network).await?;
        let gas_price_gwei = gas_price / WEI_PER_GWEI;

        if gas_price_gwei > self.config.max_gas_price_gwei as u128 {
            return Err(GatewayError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: self.config.max_gas_price_gwei,
            });
        }

        Ok((gas_price as f64 * self.config.gas_price_multiplier) as u128)
    }

    /// Build an unsigned legacy (EIP-155) transaction.
    pub async fn build(&self, signer: &BoundSigner, request: &TxRequest) -> GatewayResult<TxLegacy> {
        let network = signer.network();
        let nonce = self.pool.transaction_count(network, signer.address()).await?;
        let gas_price = self.gas_price(network).await?;
        let gas_limit = match request.gas_limit {
            Some(limit) => limit,
            None => {
                let estimate = self.estimate_gas(signer, request).await?;
                estimate.saturating_mul(100 + GAS_LIMIT_BUFFER_PERCENT) / 100
            }
        };

        Ok(TxLegacy {
            chain_id: Some(signer.chain_id()),
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Call(request.to),
            value: request.value,
            input: request.data.clone(),
        })
    }

    /// Sign and encode. Returns the transaction hash and raw bytes.
    pub fn sign(&self, signer: &BoundSigner, tx: TxLegacy) -> GatewayResult<(TxHash, Bytes)> {
        let signature = signer.sign_hash(&tx.signature_hash())?;
        let signed = tx.into_signed(signature);
        let tx_hash = *signed.hash();
        let envelope = TxEnvelope::Legacy(signed);
        Ok((tx_hash, Bytes::from(envelope.encoded_2718())))
    }

    /// Build, sign and broadcast. Does not wait for inclusion.
    pub async fn send(&self, signer: &BoundSigner, request: TxRequest) -> GatewayResult<SentTransaction> {
        let network = signer.network();
        let tx = self.build(signer, &request).await?;
        let (nonce, gas_limit, gas_price) = (tx.nonce, tx.gas_limit, tx.gas_price);

        let (tx_hash, raw) = self.sign(signer, tx)?;
        let hash = self.pool.send_raw_transaction(network, raw, tx_hash).await?;
        if hash != tx_hash {
            tracing::warn!(expected = %tx_hash, reported = %hash, "Node reported a different transaction hash");
        }

        tracing::info!(
            network = %network.key,
            tx_hash = %tx_hash,
            from = %signer.address(),
            to = %request.to,
            nonce,
            "Transaction broadcast"
        );

        Ok(SentTransaction {
            hash: tx_hash,
            from: signer.address(),
            nonce,
            gas_limit,
            gas_price,
            explorer_url: network.explorer_tx_url(&tx_hash.to_string()),
        })
    }

    /// Send `amount` (decimal string) of the native token.
    pub async fn send_native(
        &self,
        signer: &BoundSigner,
        to: Address,
        amount: &str,
    ) -> GatewayResult<SentTransaction> {
        let value = units::parse_amount(amount, signer.network().native_token.decimals)?;
        self.send(signer, TxRequest::transfer(to, value)).await
    }

    /// Send `amount` (decimal string) of an ERC-20 token.
    pub async fn send_token(
        &self,
        signer: &BoundSigner,
        token: Address,
        to: Address,
        amount: &str,
        decimals: u8,
    ) -> GatewayResult<SentTransaction> {
        let value = units::parse_amount(amount, decimals)?;
        self.send(signer, TxRequest::call(token, erc20::transfer_calldata(to, value)))
            .await
    }

    /// Approve `spender` for exactly `amount` raw units of `token`.
    pub async fn approve(
        &self,
        signer: &BoundSigner,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> GatewayResult<SentTransaction> {
        self.send(signer, TxRequest::call(token, erc20::approve_calldata(spender, amount)))
            .await
    }

    /// Current state of `tx_hash`, from a single receipt lookup.
    pub async fn confirmation_status(
        &self,
        network: &NetworkDescriptor,
        tx_hash: TxHash,
    ) -> GatewayResult<ConfirmationStatus> {
        let Some(receipt) = self.pool.receipt(network, tx_hash).await? else {
            return Ok(ConfirmationStatus::Pending);
        };

        if !receipt.status() {
            return Ok(ConfirmationStatus::Failed {
                reason: "Transaction reverted".to_string(),
            });
        }

        let current_block = self.pool.block_number(network).await?;
        let tx_block = receipt.block_number.unwrap_or(current_block);
        // The inclusion block counts as the first confirmation.
        let confirmations = current_block.saturating_sub(tx_block).saturating_add(1) as u32;
        let required = self.config.confirmation_blocks;

        if confirmations >= required {
            Ok(ConfirmationStatus::Confirmed {
                block_number: tx_block,
            })
        } else {
            Ok(ConfirmationStatus::Confirming {
                current: confirmations,
                required,
            })
        }
    }

    /// Poll until the transaction is confirmed or failed.
    pub async fn wait_for_confirmation(
        &self,
        network: &NetworkDescriptor,
        tx_hash: TxHash,
    ) -> GatewayResult<ConfirmationStatus> {
        let timeout_secs = self.config.confirmation_timeout_secs;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms.max(1));

        let result = timeout(Duration::from_secs(timeout_secs), async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                match self.confirmation_status(network, tx_hash).await? {
                    ConfirmationStatus::Pending => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    }
                    ConfirmationStatus::Confirming { current, required } => {
                        tracing::debug!(
                            tx_hash = %tx_hash,
                            confirmations = current,
                            required,
                            "Waiting for confirmations"
                        );
                    }
                    done => return Ok(done),
                }
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(GatewayError::ConfirmationTimeout(timeout_secs)),
        }
    }
}
