//! A single JSON-RPC endpoint.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use serde::Serialize;

/// One parsed endpoint with its provider handle.
#[derive(Clone)]
pub struct Endpoint {
    pub url: String,
    provider: DynProvider,
}

impl Endpoint {
    /// Parse a URL into an HTTP endpoint. Returns `None` for unparsable URLs.
    pub fn parse(url_str: &str) -> Option<Self> {
        let url: url::Url = url_str.parse().ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        Some(Self {
            url: url_str.to_string(),
            provider: ProviderBuilder::new().connect_http(url).erased(),
        })
    }

    /// Cheap clone of the provider handle.
    pub fn provider(&self) -> DynProvider {
        self.provider.clone()
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint").field("url", &self.url).finish()
    }
}

/// Point-in-time health of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointHealth {
    pub url: String,
    pub healthy: bool,
    /// Tip reported by the endpoint when it answered.
    pub latest_block: Option<u64>,
    pub latency_ms: u64,
}
