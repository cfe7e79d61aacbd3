//! Gateway facade.
//!
//! Owns every component and runs each operation against the active network.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::primitives::{Address, TxHash};

use crate::balances::{BalanceAggregator, BalanceSnapshot};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::history::{HistoryScanner, NetworkBlockSource, TransactionRecord};
use crate::network::{NetworkDescriptor, NetworkRegistry, TokenDescriptor};
use crate::resilience::RetryPolicy;
use crate::rpc::{EndpointHealth, EndpointPool};
use crate::swap::{SwapBroker, SwapExecution, SwapQuote, SwapRequest};
use crate::tokens::{CustomToken, FileTokenStore, MemoryTokenStore, TokenRegistry, TokenStore, TokenValidation};
use crate::transactions::{ConfirmationStatus, SentTransaction, TxBuilder, TxRequest};
use crate::wallet::{ConnectionInfo, WalletInfo, WalletSession};

/// Single entry point for wallet, token, balance, history and swap operations.
pub struct Gateway {
    config: GatewayConfig,
    registry: NetworkRegistry,
    pool: EndpointPool,
    tokens: TokenRegistry,
    balances: BalanceAggregator,
    history: HistoryScanner,
    tx_builder: TxBuilder,
    swap: SwapBroker,
    session: WalletSession,
    active: Arc<NetworkDescriptor>,
}

impl Gateway {
    /// Build a gateway with the token store named in the config.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let store: Arc<dyn TokenStore> = match &config.storage.custom_tokens_path {
            Some(path) => Arc::new(FileTokenStore::open(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::with_store(config, store)
    }

    /// Build a gateway over an explicit token store.
    pub fn with_store(config: GatewayConfig, store: Arc<dyn TokenStore>) -> GatewayResult<Self> {
        let registry = NetworkRegistry::builtin().with_overrides(&config.networks);
        let active = registry.get(&config.default_network.0)?;
        let pool = EndpointPool::new(&registry, &config.rpc);
        let tx_builder = TxBuilder::new(pool.clone(), config.transactions.clone());
        let swap = SwapBroker::new(&config.aggregator, pool.clone(), tx_builder.clone())?;

        tracing::info!(
            network = %active.key,
            networks = registry.len(),
            "Gateway initialized"
        );

        Ok(Self {
            tokens: TokenRegistry::new(pool.clone(), store),
            balances: BalanceAggregator::new(pool.clone()),
            history: HistoryScanner::new(config.history.clone()),
            session: WalletSession::new(config.wallet.clone(), RetryPolicy::from_config(&config.retry)),
            registry,
            pool,
            tx_builder,
            swap,
            active,
            config,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn networks(&self) -> Vec<Arc<NetworkDescriptor>> {
        self.registry.iter().cloned().collect()
    }

    pub fn active_network(&self) -> &Arc<NetworkDescriptor> {
        &self.active
    }

    /// Select another network.
    ///
    /// A connected wallet is rebound first; if that fails nothing changes.
    pub async fn set_network(&mut self, key: &str) -> GatewayResult<Option<ConnectionInfo>> {
        let network = self.registry.get(key)?;
        let info = if self.session.is_connected() {
            Some(self.session.switch_network(network.clone(), &self.pool).await?)
        } else {
            None
        };
        tracing::info!(from = %self.active.key, to = %network.key, "Active network changed");
        self.active = network;
        Ok(info)
    }

    /// Explorer link for a transaction on the active network.
    pub fn explorer_url(&self, tx_hash: &TxHash) -> String {
        self.active.explorer_tx_url(&tx_hash.to_string())
    }

    /// Health of every endpoint of the active network.
    pub async fn health(&self) -> GatewayResult<Vec<EndpointHealth>> {
        self.pool.probe(&self.active).await
    }

    // Wallet

    pub async fn connect_with_mnemonic(&mut self, phrase: &str) -> GatewayResult<ConnectionInfo> {
        self.session
            .connect_with_mnemonic(phrase, self.active.clone(), &self.pool)
            .await
    }

    pub async fn connect_with_private_key(&mut self, private_key_hex: &str) -> GatewayResult<ConnectionInfo> {
        self.session
            .connect_with_private_key(private_key_hex, self.active.clone(), &self.pool)
            .await
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    pub fn wallet(&self) -> &WalletSession {
        &self.session
    }

    pub fn wallet_info(&self) -> GatewayResult<WalletInfo> {
        self.session.info()
    }

    fn owner(&self, address: Option<Address>) -> GatewayResult<Address> {
        match address {
            Some(address) => Ok(address),
            None => self.session.address().ok_or(GatewayError::NoWalletConnected),
        }
    }

    // Tokens

    pub async fn validate_token(&self, address: &str) -> GatewayResult<TokenValidation> {
        self.tokens.validate(address, &self.active).await
    }

    pub async fn add_custom_token(&self, address: &str) -> GatewayResult<TokenDescriptor> {
        self.tokens.add_custom_token(address, &self.active).await
    }

    pub fn remove_custom_token(&self, address: &str) -> GatewayResult<bool> {
        self.tokens.remove_custom_token(address, &self.active)
    }

    pub fn custom_tokens(&self) -> GatewayResult<Vec<CustomToken>> {
        self.tokens.custom_tokens(&self.active)
    }

    pub fn all_tokens(&self) -> GatewayResult<BTreeMap<String, TokenDescriptor>> {
        self.tokens.all_tokens(&self.active)
    }

    /// Resolve a token by symbol or address on the active network.
    pub fn find_token(&self, query: &str) -> GatewayResult<TokenDescriptor> {
        self.tokens.find(query, &self.active)
    }

    // Balances

    /// Native balance of `address`, or of the connected wallet.
    pub async fn native_balance(&self, address: Option<Address>) -> GatewayResult<BalanceSnapshot> {
        let owner = self.owner(address)?;
        self.balances.native_balance(owner, &self.active).await
    }

    pub async fn token_balance(
        &self,
        token: &TokenDescriptor,
        address: Option<Address>,
    ) -> GatewayResult<BalanceSnapshot> {
        let owner = self.owner(address)?;
        self.balances.token_balance(token, owner, &self.active).await
    }

    pub async fn all_balances(&self, address: Option<Address>) -> GatewayResult<Vec<BalanceSnapshot>> {
        let owner = self.owner(address)?;
        self.balances.all_balances(owner, &self.active, &self.tokens).await
    }

    // History

    /// Recent transactions of `address` (or the wallet); `limit` defaults from config.
    pub async fn history(
        &self,
        address: Option<Address>,
        limit: Option<usize>,
    ) -> GatewayResult<Vec<TransactionRecord>> {
        let owner = self.owner(address)?;
        let limit = limit.unwrap_or(self.config.history.default_limit);
        let source = NetworkBlockSource::new(&self.pool, &self.active);
        self.history.scan(&source, owner, limit).await
    }

    // Transactions

    pub async fn send_native(&self, to: Address, amount: &str) -> GatewayResult<SentTransaction> {
        let signer = self.session.signer()?;
        self.tx_builder.send_native(signer, to, amount).await
    }

    /// Send an ERC-20 token identified by symbol or address.
    pub async fn send_token(&self, token: &str, to: Address, amount: &str) -> GatewayResult<SentTransaction> {
        let signer = self.session.signer()?;
        let token = self.find_token(token)?;
        if token.is_native() {
            return self.tx_builder.send_native(signer, to, amount).await;
        }
        self.tx_builder
            .send_token(signer, token.address, to, amount, token.decimals)
            .await
    }

    pub async fn send(&self, request: TxRequest) -> GatewayResult<SentTransaction> {
        let signer = self.session.signer()?;
        self.tx_builder.send(signer, request).await
    }

    pub async fn estimate_gas(&self, request: &TxRequest) -> GatewayResult<u64> {
        let signer = self.session.signer()?;
        self.tx_builder.estimate_gas(signer, request).await
    }

    pub async fn confirmation_status(&self, tx_hash: TxHash) -> GatewayResult<ConfirmationStatus> {
        self.tx_builder.confirmation_status(&self.active, tx_hash).await
    }

    pub async fn wait_for_confirmation(&self, tx_hash: TxHash) -> GatewayResult<ConfirmationStatus> {
        self.tx_builder.wait_for_confirmation(&self.active, tx_hash).await
    }

    // Swaps

    pub async fn quote(&self, request: &SwapRequest) -> GatewayResult<SwapQuote> {
        self.swap.quote(request, &self.active).await
    }

    pub async fn execute_swap(&self, request: &SwapRequest, slippage: f64) -> GatewayResult<TxHash> {
        let signer = self.session.signer()?;
        self.swap.execute(request, slippage, signer).await
    }

    pub async fn execute_quote(&self, quote: &SwapQuote, slippage: f64) -> GatewayResult<SwapExecution> {
        let signer = self.session.signer()?;
        self.swap.execute_quote(quote, slippage, signer).await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("active", &self.active.key)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
