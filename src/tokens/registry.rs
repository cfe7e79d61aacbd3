//! Token registry: built-in tokens plus user-added ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{GatewayError, GatewayResult, InputKind};
use crate::network::{NetworkDescriptor, TokenDescriptor};
use crate::rpc::EndpointPool;
use crate::tokens::store::{CustomToken, TokenStore};
use crate::tokens::validator::{self, TokenValidation};

/// Per-network token lists backed by a [`TokenStore`].
#[derive(Clone)]
pub struct TokenRegistry {
    pool: EndpointPool,
    store: Arc<dyn TokenStore>,
}

impl TokenRegistry {
    pub fn new(pool: EndpointPool, store: Arc<dyn TokenStore>) -> Self {
        Self { pool, store }
    }

    /// Validate a contract address without storing anything.
    pub async fn validate(
        &self,
        address: &str,
        network: &NetworkDescriptor,
    ) -> GatewayResult<TokenValidation> {
        validator::validate(&self.pool, network, address).await
    }

    /// Validate and upsert a custom token (matched by address).
    pub async fn add_custom_token(
        &self,
        address: &str,
        network: &NetworkDescriptor,
    ) -> GatewayResult<TokenDescriptor> {
        let validated = match self.validate(address, network).await? {
            TokenValidation::Valid(token) => token,
            TokenValidation::Invalid { address, reason } => {
                tracing::info!(network = %network.key, token = %address, reason = %reason, "Rejected custom token");
                return Err(GatewayError::InvalidTokenContract(address));
            }
        };

        let descriptor = TokenDescriptor {
            address: validated.address,
            symbol: validated.symbol,
            name: validated.name,
            decimals: validated.decimals,
            is_custom: true,
            network: network.key.clone(),
        };

        let mut tokens = self.store.load(&network.key)?;
        let entry = CustomToken::new(descriptor.clone());
        match tokens.iter_mut().find(|t| t.token.has_address(&descriptor.address)) {
            Some(existing) => *existing = entry,
            None => tokens.push(entry),
        }
        self.store.save(&network.key, &tokens)?;

        tracing::info!(
            network = %network.key,
            token = %descriptor.address,
            symbol = %descriptor.symbol,
            "Custom token added"
        );
        Ok(descriptor)
    }

    /// Remove a custom token. Returns whether anything was removed.
    pub fn remove_custom_token(&self, address: &str, network: &NetworkDescriptor) -> GatewayResult<bool> {
        let address = validator::parse_address(address)?;
        let mut tokens = self.store.load(&network.key)?;
        let before = tokens.len();
        tokens.retain(|t| !t.token.has_address(&address));
        if tokens.len() == before {
            return Ok(false);
        }
        self.store.save(&network.key, &tokens)?;
        tracing::info!(network = %network.key, token = %address, "Custom token removed");
        Ok(true)
    }

    /// Custom tokens stored for the network.
    pub fn custom_tokens(&self, network: &NetworkDescriptor) -> GatewayResult<Vec<CustomToken>> {
        self.store.load(&network.key)
    }

    /// Built-in tokens overlaid with custom ones, keyed by symbol.
    ///
    /// A custom token replaces a built-in token of the same symbol, except the
    /// native pseudo-token, which is always present.
    pub fn all_tokens(&self, network: &NetworkDescriptor) -> GatewayResult<BTreeMap<String, TokenDescriptor>> {
        let mut tokens = network.known_tokens.clone();
        let native = network.native_descriptor();
        if !tokens.values().any(TokenDescriptor::is_native) {
            tokens.insert(native.symbol.clone(), native);
        }

        for custom in self.store.load(&network.key)? {
            let symbol = custom.token.symbol.clone();
            if tokens.get(&symbol).is_some_and(TokenDescriptor::is_native) {
                tracing::debug!(network = %network.key, symbol = %symbol, "Custom token shadows native symbol, skipped");
                continue;
            }
            tokens.insert(symbol, custom.token);
        }
        Ok(tokens)
    }

    /// Resolve a token by symbol (case-insensitive) or address.
    pub fn find(&self, query: &str, network: &NetworkDescriptor) -> GatewayResult<TokenDescriptor> {
        let tokens = self.all_tokens(network)?;
        let query = query.trim();
        let found = if query.starts_with("0x") {
            let address = validator::parse_address(query)?;
            tokens.into_values().find(|t| t.has_address(&address))
        } else {
            tokens
                .into_values()
                .find(|t| t.symbol.eq_ignore_ascii_case(query))
        };
        found.ok_or_else(|| {
            GatewayError::invalid(
                InputKind::Address,
                format!("unknown token '{query}' on {}", network.key),
            )
        })
    }
}

impl std::fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRegistry").finish_non_exhaustive()
    }
}
