//! Bounded backward block scan.
//!
//! # Responsibilities
//! - Walk back from the tip within the lookback window and scan budget
//! - Match transactions sent from or to one address
//! - Enrich matches with receipt status and gas data
//! - Stop as soon as enough records are collected

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;

use crate::config::HistoryConfig;
use crate::error::GatewayResult;
use crate::history::source::{BlockSource, ScannedTransaction};
use crate::observability::metrics;
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Success,
    Failed,
}

/// Direction of a transaction relative to the scanned address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
    Contract,
}

impl Direction {
    fn classify(tx: &ScannedTransaction, address: Address) -> Self {
        if tx.from == address {
            Direction::Sent
        } else if tx.to == Some(address) {
            Direction::Received
        } else {
            Direction::Contract
        }
    }
}

/// One reconstructed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub block_number: u64,
    /// Block timestamp, unix seconds.
    pub timestamp: u64,
    pub from: Address,
    pub to: Option<Address>,
    /// Value in wei.
    pub value: U256,
    /// Value in native units.
    pub value_native: String,
    pub gas_used: u64,
    pub gas_price: u128,
    pub status: TxStatus,
    pub direction: Direction,
}

/// Reconstructs recent history for an address by scanning blocks.
#[derive(Debug, Clone)]
pub struct HistoryScanner {
    config: HistoryConfig,
}

impl HistoryScanner {
    pub fn new(config: HistoryConfig) -> Self {
        Self { config }
    }

    /// Up to `limit` transactions involving `address`, newest first.
    ///
    /// Only the tip lookup can fail the scan; unreadable blocks are skipped.
    pub async fn scan<S: BlockSource>(
        &self,
        source: &S,
        address: Address,
        limit: usize,
    ) -> GatewayResult<Vec<TransactionRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let network = source.network();
        let native_decimals = network.native_token.decimals;
        let latest = source.latest_block().await?;
        let floor = latest.saturating_sub(self.config.max_lookback_blocks);
        let budget = self.config.max_blocks_scanned as usize;

        let mut records = Vec::new();
        let mut scanned = 0u64;

        'blocks: for number in (floor..=latest).rev().take(budget) {
            let block = match source.block(number).await {
                Ok(Some(block)) => block,
                Ok(None) => {
                    tracing::debug!(network = %network.key, block = number, "Block not available, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(network = %network.key, block = number, error = %e, "Failed to fetch block, skipping");
                    continue;
                }
            };
            scanned += 1;

            for tx in &block.transactions {
                if tx.from != address && tx.to != Some(address) {
                    continue;
                }

                let receipt = match source.receipt(tx.hash).await {
                    Ok(receipt) => receipt,
                    Err(e) => {
                        tracing::warn!(network = %network.key, tx_hash = %tx.hash, error = %e, "Failed to fetch receipt, skipping transaction");
                        continue;
                    }
                };

                let (status, gas_used, gas_price) = match receipt {
                    Some(r) => (
                        if r.success { TxStatus::Success } else { TxStatus::Failed },
                        r.gas_used,
                        r.effective_gas_price,
                    ),
                    None => (TxStatus::Failed, 0, tx.gas_price),
                };

                records.push(TransactionRecord {
                    hash: tx.hash,
                    block_number: block.number,
                    timestamp: block.timestamp,
                    from: tx.from,
                    to: tx.to,
                    value: tx.value,
                    value_native: units::format_amount(tx.value, native_decimals),
                    gas_used,
                    gas_price,
                    status,
                    direction: Direction::classify(tx, address),
                });

                if records.len() >= limit {
                    break 'blocks;
                }
            }
        }

        metrics::record_blocks_scanned(&network.key, scanned);
        tracing::debug!(
            network = %network.key,
            address = %address,
            latest,
            scanned,
            found = records.len(),
            "History scan finished"
        );

        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.block_number.cmp(&a.block_number))
        });
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use alloy::primitives::address;

    use super::*;
    use crate::error::GatewayError;
    use crate::history::source::{ScannedBlock, ScannedReceipt};
    use crate::network::{NetworkDescriptor, NetworkRegistry};

    const WALLET: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const OTHER: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

    struct FakeChain {
        network: Arc<NetworkDescriptor>,
        latest: u64,
        blocks: HashMap<u64, ScannedBlock>,
        failing_blocks: Vec<u64>,
        receipts: HashMap<TxHash, ScannedReceipt>,
        fetched: AtomicU64,
    }

    impl FakeChain {
        fn new(latest: u64) -> Self {
            Self {
                network: NetworkRegistry::builtin().get("ethereum").unwrap(),
                latest,
                blocks: HashMap::new(),
                failing_blocks: Vec::new(),
                receipts: HashMap::new(),
                fetched: AtomicU64::new(0),
            }
        }

        fn with_tx(mut self, number: u64, from: Address, to: Address, success: bool) -> Self {
            let hash = TxHash::with_last_byte((self.receipts.len() + 1) as u8);
            let block = self.blocks.entry(number).or_insert_with(|| ScannedBlock {
                number,
                timestamp: 1_700_000_000 + number * 12,
                transactions: Vec::new(),
            });
            block.transactions.push(ScannedTransaction {
                hash,
                from,
                to: Some(to),
                value: U256::from(1_000_000_000_000_000_000u128),
                gas_price: 7,
            });
            self.receipts.insert(
                hash,
                ScannedReceipt {
                    success,
                    gas_used: 21_000,
                    effective_gas_price: 5,
                },
            );
            self
        }
    }

    impl BlockSource for FakeChain {
        fn network(&self) -> &NetworkDescriptor {
            &self.network
        }

        fn latest_block(&self) -> impl Future<Output = GatewayResult<u64>> + Send {
            let latest = self.latest;
            async move { Ok(latest) }
        }

        fn block(&self, number: u64) -> impl Future<Output = GatewayResult<Option<ScannedBlock>>> + Send {
            self.fetched.fetch_add(1, Ordering::SeqCst);
            let result = if self.failing_blocks.contains(&number) {
                Err(GatewayError::ConnectionFailed("boom".into()))
            } else {
                Ok(Some(self.blocks.get(&number).cloned().unwrap_or(ScannedBlock {
                    number,
                    timestamp: 1_700_000_000 + number * 12,
                    transactions: Vec::new(),
                })))
            };
            async move { result }
        }

        fn receipt(&self, hash: TxHash) -> impl Future<Output = GatewayResult<Option<ScannedReceipt>>> + Send {
            let receipt = self.receipts.get(&hash).copied();
            async move { Ok(receipt) }
        }
    }

    fn scanner() -> HistoryScanner {
        HistoryScanner::new(HistoryConfig::default())
    }

    #[tokio::test]
    async fn test_classifies_and_orders() {
        let chain = FakeChain::new(5000)
            .with_tx(4990, WALLET, OTHER, true)
            .with_tx(4995, OTHER, WALLET, false)
            .with_tx(4980, OTHER, OTHER, true);

        let records = scanner().scan(&chain, WALLET, 20).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].block_number, 4995);
        assert_eq!(records[0].direction, Direction::Received);
        assert_eq!(records[0].status, TxStatus::Failed);
        assert_eq!(records[1].direction, Direction::Sent);
        assert_eq!(records[1].status, TxStatus::Success);
        assert_eq!(records[1].value_native, "1.0");
        assert_eq!(records[1].gas_price, 5);
    }

    #[tokio::test]
    async fn test_scan_budget() {
        let chain = FakeChain::new(5000).with_tx(4850, WALLET, OTHER, true);
        let records = scanner().scan(&chain, WALLET, 20).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(chain.fetched.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn test_short_chain() {
        let chain = FakeChain::new(9).with_tx(0, OTHER, WALLET, true);
        let records = scanner().scan(&chain, WALLET, 20).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(chain.fetched.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_stops_at_limit() {
        let chain = FakeChain::new(100)
            .with_tx(100, WALLET, OTHER, true)
            .with_tx(99, WALLET, OTHER, true)
            .with_tx(98, WALLET, OTHER, true);
        let records = scanner().scan(&chain, WALLET, 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(chain.fetched.load(Ordering::SeqCst), 2);
        assert_eq!(records[0].block_number, 100);
    }

    #[tokio::test]
    async fn test_zero_limit_scans_nothing() {
        let chain = FakeChain::new(100).with_tx(100, WALLET, OTHER, true);
        assert!(scanner().scan(&chain, WALLET, 0).await.unwrap().is_empty());
        assert_eq!(chain.fetched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_blocks_are_skipped() {
        let mut chain = FakeChain::new(100)
            .with_tx(100, WALLET, OTHER, true)
            .with_tx(97, OTHER, WALLET, true);
        chain.failing_blocks = vec![100];
        let records = scanner().scan(&chain, WALLET, 20).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].block_number, 97);
    }
}
