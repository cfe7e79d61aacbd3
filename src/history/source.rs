//! Block access for the history scanner.

use std::future::Future;

use alloy::consensus::Transaction as ConsensusTx;
use alloy::network::TransactionResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::BlockTransactions;

use crate::error::GatewayResult;
use crate::network::NetworkDescriptor;
use crate::rpc::EndpointPool;

/// A transaction as seen in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTransaction {
    pub hash: TxHash,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub gas_price: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedBlock {
    pub number: u64,
    /// Unix seconds.
    pub timestamp: u64,
    pub transactions: Vec<ScannedTransaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedReceipt {
    pub success: bool,
    pub gas_used: u64,
    pub effective_gas_price: u128,
}

/// Where the scanner reads blocks from.
pub trait BlockSource {
    fn network(&self) -> &NetworkDescriptor;

    fn latest_block(&self) -> impl Future<Output = GatewayResult<u64>> + Send;

    /// Block with full transactions; `None` when the node does not have it
    /// or cannot return the transaction bodies.
    fn block(&self, number: u64) -> impl Future<Output = GatewayResult<Option<ScannedBlock>>> + Send;

    fn receipt(&self, hash: TxHash) -> impl Future<Output = GatewayResult<Option<ScannedReceipt>>> + Send;
}

/// [`BlockSource`] backed by the endpoint pool.
#[derive(Debug, Clone, Copy)]
pub struct NetworkBlockSource<'a> {
    pool: &'a EndpointPool,
    network: &'a NetworkDescriptor,
}

impl<'a> NetworkBlockSource<'a> {
    pub fn new(pool: &'a EndpointPool, network: &'a NetworkDescriptor) -> Self {
        Self { pool, network }
    }
}

impl BlockSource for NetworkBlockSource<'_> {
    fn network(&self) -> &NetworkDescriptor {
        self.network
    }

    fn latest_block(&self) -> impl Future<Output = GatewayResult<u64>> + Send {
        self.pool.block_number(self.network)
    }

    fn block(&self, number: u64) -> impl Future<Output = GatewayResult<Option<ScannedBlock>>> + Send {
        async move {
            let Some(block) = self.pool.block_with_transactions(self.network, number).await? else {
                return Ok(None);
            };
            let transactions = match &block.transactions {
                BlockTransactions::Full(txs) => txs
                    .iter()
                    .map(|tx| ScannedTransaction {
                        hash: TransactionResponse::tx_hash(tx),
                        from: TransactionResponse::from(tx),
                        to: ConsensusTx::to(tx),
                        value: ConsensusTx::value(tx),
                        gas_price: tx
                            .effective_gas_price
                            .or_else(|| ConsensusTx::gas_price(tx))
                            .unwrap_or_default(),
                    })
                    .collect(),
                BlockTransactions::Hashes(hashes) if hashes.is_empty() => Vec::new(),
                _ => {
                    // Treat as missing rather than as an empty block.
                    tracing::warn!(
                        network = %self.network.key,
                        block = number,
                        "Node returned block without transaction bodies"
                    );
                    return Ok(None);
                }
            };
            Ok(Some(ScannedBlock {
                number: block.header.number,
                timestamp: block.header.timestamp,
                transactions,
            }))
        }
    }

    fn receipt(&self, hash: TxHash) -> impl Future<Output = GatewayResult<Option<ScannedReceipt>>> + Send {
        async move {
            let receipt = self.pool.receipt(self.network, hash).await?;
            Ok(receipt.map(|r| ScannedReceipt {
                success: r.status(),
                gas_used: r.gas_used,
                effective_gas_price: r.effective_gas_price,
            }))
        }
    }
}
