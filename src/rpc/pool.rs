//! Per-network endpoint pool with ordered failover.
//!
//! # Responsibilities
//! - Hold `[primary, ...backups]` providers for every registered network
//! - Run one logical request against them in order until one answers
//! - Bound every attempt with the configured RPC timeout
//! - Report per-endpoint health on demand

use std::borrow::Cow;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::eips::BlockNumberOrTag;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::{Block, TransactionReceipt, TransactionRequest};
use alloy::transports::TransportResult;
use futures_util::future::join_all;
use tokio::time::timeout;

use crate::config::RpcConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::network::{NetworkDescriptor, NetworkRegistry};
use crate::observability::metrics::{self, AttemptOutcome};
use crate::resilience::retries::{classify, Failure};
use crate::rpc::endpoint::{Endpoint, EndpointHealth};

/// RPC endpoint pool shared by every gateway component.
///
/// Cloning is cheap; clones share the provider handles.
#[derive(Clone)]
pub struct EndpointPool {
    endpoints: Arc<HashMap<String, Vec<Endpoint>>>,
    timeout_duration: Duration,
    failover_delay: Duration,
}

impl EndpointPool {
    /// Build providers for every network in the registry.
    pub fn new(registry: &NetworkRegistry, config: &RpcConfig) -> Self {
        let mut endpoints = HashMap::with_capacity(registry.len());
        for network in registry.iter() {
            let mut parsed = Vec::new();
            for url_str in network.endpoints() {
                match Endpoint::parse(&url_str) {
                    Some(endpoint) => parsed.push(endpoint),
                    None => tracing::warn!(
                        network = %network.key,
                        url = %url_str,
                        "Ignoring invalid RPC URL"
                    ),
                }
            }
            endpoints.insert(network.key.clone(), parsed);
        }

        Self {
            endpoints: Arc::new(endpoints),
            timeout_duration: Duration::from_secs(config.timeout_secs),
            failover_delay: Duration::from_millis(config.failover_delay_ms),
        }
    }

    /// URLs of a network's endpoints, in failover order.
    pub fn endpoint_urls(&self, network: &str) -> Vec<String> {
        self.endpoints
            .get(network)
            .map(|list| list.iter().map(|e| e.url.clone()).collect())
            .unwrap_or_default()
    }

    fn endpoints_for(&self, network: &NetworkDescriptor) -> GatewayResult<&[Endpoint]> {
        self.endpoints
            .get(&network.key)
            .map(Vec::as_slice)
            .ok_or_else(|| GatewayError::UnsupportedNetwork(network.key.clone()))
    }

    /// Run `op` against each endpoint in order until one succeeds.
    ///
    /// Waits the failover delay between endpoints, never after the last one.
    /// Execution reverts are returned immediately.
    pub async fn call<T, F, Fut>(
        &self,
        network: &NetworkDescriptor,
        method: &str,
        op: F,
    ) -> GatewayResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let endpoints = self.endpoints_for(network)?;
        let total = endpoints.len();

        for (i, endpoint) in endpoints.iter().enumerate() {
            let start = Instant::now();
            match timeout(self.timeout_duration, op(endpoint.provider())).await {
                Ok(Ok(result)) => {
                    metrics::record_rpc_attempt(&network.key, AttemptOutcome::Success, start);
                    if i > 0 {
                        tracing::debug!(
                            network = %network.key,
                            method,
                            provider_idx = i,
                            "Request served by backup provider"
                        );
                    }
                    return Ok(result);
                }
                Ok(Err(e)) => match classify(e) {
                    Failure::Fatal(err) => {
                        metrics::record_rpc_attempt(&network.key, AttemptOutcome::Reverted, start);
                        return Err(err);
                    }
                    Failure::Failover(reason) => {
                        metrics::record_rpc_attempt(&network.key, AttemptOutcome::Error, start);
                        tracing::warn!(
                            network = %network.key,
                            method,
                            provider_idx = i,
                            url = %endpoint.url,
                            error = %reason,
                            "RPC error, trying next provider"
                        );
                    }
                },
                Err(_) => {
                    metrics::record_rpc_attempt(&network.key, AttemptOutcome::Timeout, start);
                    tracing::warn!(
                        network = %network.key,
                        method,
                        provider_idx = i,
                        url = %endpoint.url,
                        "RPC timeout, trying next provider"
                    );
                }
            }

            if i + 1 < total {
                metrics::record_failover(&network.key);
                tokio::time::sleep(self.failover_delay).await;
            }
        }

        Err(GatewayError::AllEndpointsUnavailable {
            network: network.key.clone(),
            attempts: total,
        })
    }

    /// Raw JSON-RPC request through the failover loop.
    pub async fn request(
        &self,
        network: &NetworkDescriptor,
        method: &str,
        params: serde_json::Value,
    ) -> GatewayResult<serde_json::Value> {
        self.call(network, method, |p| {
            let method = Cow::Owned(method.to_string());
            let params = params.clone();
            async move { p.raw_request::<_, serde_json::Value>(method, params).await }
        })
        .await
    }

    /// Get the chain ID reported by the network.
    pub async fn chain_id(&self, network: &NetworkDescriptor) -> GatewayResult<u64> {
        self.call(network, "eth_chainId", |p| async move { p.get_chain_id().await })
            .await
    }

    /// Get the latest block number.
    pub async fn block_number(&self, network: &NetworkDescriptor) -> GatewayResult<u64> {
        self.call(network, "eth_blockNumber", |p| async move {
            p.get_block_number().await
        })
        .await
    }

    /// Native balance in wei.
    pub async fn balance(&self, network: &NetworkDescriptor, address: Address) -> GatewayResult<U256> {
        self.call(network, "eth_getBalance", |p| async move {
            p.get_balance(address).await
        })
        .await
    }

    /// Deployed bytecode; empty for externally owned accounts.
    pub async fn code(&self, network: &NetworkDescriptor, address: Address) -> GatewayResult<Bytes> {
        self.call(network, "eth_getCode", |p| async move {
            p.get_code_at(address).await
        })
        .await
    }

    /// Read-only contract call.
    pub async fn eth_call(
        &self,
        network: &NetworkDescriptor,
        to: Address,
        data: Bytes,
    ) -> GatewayResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.call(network, "eth_call", |p| {
            let tx = tx.clone();
            async move { p.call(tx).await }
        })
        .await
    }

    /// Block with full transaction objects.
    pub async fn block_with_transactions(
        &self,
        network: &NetworkDescriptor,
        number: u64,
    ) -> GatewayResult<Option<Block>> {
        self.call(network, "eth_getBlockByNumber", |p| async move {
            p.get_block_by_number(BlockNumberOrTag::Number(number))
                .full()
                .await
        })
        .await
    }

    pub async fn receipt(
        &self,
        network: &NetworkDescriptor,
        tx_hash: TxHash,
    ) -> GatewayResult<Option<TransactionReceipt>> {
        self.call(network, "eth_getTransactionReceipt", |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Nonce including pending transactions.
    pub async fn transaction_count(
        &self,
        network: &NetworkDescriptor,
        address: Address,
    ) -> GatewayResult<u64> {
        self.call(network, "eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    /// Current gas price in wei.
    pub async fn gas_price(&self, network: &NetworkDescriptor) -> GatewayResult<u128> {
        self.call(network, "eth_gasPrice", |p| async move { p.get_gas_price().await })
            .await
    }

    pub async fn estimate_gas(
        &self,
        network: &NetworkDescriptor,
        tx: TransactionRequest,
    ) -> GatewayResult<u64> {
        self.call(network, "eth_estimateGas", |p| {
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    /// Broadcast a signed, EIP-2718 encoded transaction.
    ///
    /// The same bytes may reach several endpoints; a node that already holds
    /// the transaction counts as success.
    pub async fn send_raw_transaction(
        &self,
        network: &NetworkDescriptor,
        raw: Bytes,
        tx_hash: TxHash,
    ) -> GatewayResult<TxHash> {
        self.call(network, "eth_sendRawTransaction", |p| {
            let raw = raw.clone();
            async move {
                match p.send_raw_transaction(&raw).await {
                    Ok(pending) => Ok(*pending.tx_hash()),
                    Err(e) if is_already_known(&e.to_string()) => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction already known to node");
                        Ok(tx_hash)
                    }
                    Err(e) => Err(e),
                }
            }
        })
        .await
    }

    /// Query every endpoint of a network concurrently.
    ///
    /// An endpoint is healthy when it returns a block number within the timeout.
    pub async fn probe(&self, network: &NetworkDescriptor) -> GatewayResult<Vec<EndpointHealth>> {
        let endpoints = self.endpoints_for(network)?;
        let checks = endpoints.iter().map(|endpoint| async move {
            let start = Instant::now();
            let provider = endpoint.provider();
            let latest_block = match timeout(self.timeout_duration, provider.get_block_number()).await {
                Ok(Ok(number)) => Some(number),
                Ok(Err(e)) => {
                    tracing::debug!(url = %endpoint.url, error = %e, "Health probe failed");
                    None
                }
                Err(_) => {
                    tracing::debug!(url = %endpoint.url, "Health probe timed out");
                    None
                }
            };
            let healthy = latest_block.is_some();
            metrics::record_endpoint_health(&endpoint.url, healthy);
            EndpointHealth {
                url: endpoint.url.clone(),
                healthy,
                latest_block,
                latency_ms: start.elapsed().as_millis() as u64,
            }
        });
        Ok(join_all(checks).await)
    }
}

fn is_already_known(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("already known")
        || message.contains("known transaction")
        || message.contains("already imported")
        || message.contains("already in mempool")
}

impl std::fmt::Debug for EndpointPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointPool")
            .field("networks", &self.endpoints.len())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .field("failover_delay_ms", &self.failover_delay.as_millis())
            .finish()
    }
}
