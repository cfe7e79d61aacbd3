//! Aggregator HTTP API client.
//!
//! # Responsibilities
//! - Map chain ids to the aggregator's chain path segment
//! - Translate the native pseudo-address to the aggregator's sentinel
//! - Fetch quotes and ready-to-sign swap transactions

use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, U256};
use reqwest::Client;
use serde::{Deserialize, Deserializer};

use crate::config::AggregatorConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::network::NATIVE_TOKEN_ADDRESS;

/// The aggregator's stand-in address for native tokens.
pub const NATIVE_SENTINEL: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Chains served by the aggregator.
pub fn aggregator_chain_id(chain_id: u64) -> Option<u64> {
    match chain_id {
        1 | 10 | 56 | 137 | 42161 => Some(chain_id),
        _ => None,
    }
}

/// Wire form of a token address.
pub fn wire_token(token: Address) -> Address {
    if token == NATIVE_TOKEN_ADDRESS {
        NATIVE_SENTINEL
    } else {
        token
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    #[serde(rename = "toAmount", deserialize_with = "u256_string_or_number")]
    pub to_amount: U256,
    #[serde(rename = "estimatedGas", default, deserialize_with = "opt_u64_string_or_number")]
    pub estimated_gas: Option<u64>,
    #[serde(default)]
    pub protocols: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapTx {
    pub to: Address,
    pub data: Bytes,
    #[serde(default, deserialize_with = "u256_string_or_number")]
    pub value: U256,
    #[serde(default, deserialize_with = "opt_u64_string_or_number")]
    pub gas: Option<u64>,
}

/// Some aggregator versions return only `tx` from `/swap`.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapResponse {
    #[serde(rename = "toAmount", default, deserialize_with = "opt_u256_string_or_number")]
    pub to_amount: Option<U256>,
    pub tx: SwapTx,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

fn u256_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) if s.is_empty() => Ok(U256::ZERO),
        StringOrNumber::String(s) => s.parse().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => Ok(U256::from(n)),
    }
}

fn opt_u256_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::String(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        Some(StringOrNumber::Number(n)) => Ok(Some(U256::from(n))),
    }
}

fn opt_u64_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::String(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        Some(StringOrNumber::Number(n)) => Ok(Some(n)),
    }
}

/// Protocol names found anywhere in the aggregator's nested route description.
pub fn route_names(protocols: &serde_json::Value) -> Vec<String> {
    let mut names = Vec::new();
    collect_names(protocols, &mut names);
    names
}

fn collect_names(value: &serde_json::Value, names: &mut Vec<String>) {
    match value {
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_names(v, names)),
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(name)) = map.get("name") {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        _ => {}
    }
}

/// HTTP client for the aggregator API.
#[derive(Debug, Clone)]
pub struct AggregatorClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AggregatorClient {
    pub fn new(config: &AggregatorConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::QuoteFailed(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    fn get(&self, chain_id: u64, endpoint: &str) -> reqwest::RequestBuilder {
        let request = self
            .http
            .get(format!("{}/{}/{}", self.base_url, chain_id, endpoint))
            .header("accept", "application/json");
        match &self.api_key {
            Some(key) => request.bearer_auth(key.trim()),
            None => request,
        }
    }

    /// `GET /{chain}/quote`.
    pub async fn quote(
        &self,
        chain_id: u64,
        src: Address,
        dst: Address,
        amount: U256,
    ) -> GatewayResult<QuoteResponse> {
        let response = self
            .get(chain_id, "quote")
            .query(&[
                ("src", format!("{:#x}", wire_token(src))),
                ("dst", format!("{:#x}", wire_token(dst))),
                ("amount", amount.to_string()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::QuoteFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::QuoteFailed(format!("HTTP {status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::QuoteFailed(format!("malformed quote: {e}")))
    }

    /// `GET /{chain}/swap`. Slippage is in percent.
    pub async fn swap(
        &self,
        chain_id: u64,
        src: Address,
        dst: Address,
        amount: U256,
        from: Address,
        slippage: f64,
    ) -> GatewayResult<SwapResponse> {
        let response = self
            .get(chain_id, "swap")
            .query(&[
                ("src", format!("{:#x}", wire_token(src))),
                ("dst", format!("{:#x}", wire_token(dst))),
                ("amount", amount.to_string()),
                ("from", format!("{from:#x}")),
                ("slippage", slippage.to_string()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::SwapExecutionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::SwapExecutionFailed(format!("HTTP {status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::SwapExecutionFailed(format!("malformed swap response: {e}")))
    }
}
