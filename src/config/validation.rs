//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and references to
//! built-in networks. Every problem is reported, not just the first.

use std::fmt;

use url::Url;

use crate::config::schema::GatewayConfig;
use crate::network::builtin;

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let known = builtin::network_keys();

    if !known.contains(&config.default_network.0.as_str()) {
        errors.push(ValidationError::new(
            "default_network",
            format!("unknown network '{}'", config.default_network.0),
        ));
    }

    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be > 0"));
    }

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::new("retry.max_attempts", "must be >= 1"));
    }
    if config.retry.max_delay_ms < config.retry.base_delay_ms {
        errors.push(ValidationError::new(
            "retry.max_delay_ms",
            "must be >= retry.base_delay_ms",
        ));
    }

    if config.transactions.gas_price_multiplier < 1.0 {
        errors.push(ValidationError::new(
            "transactions.gas_price_multiplier",
            "must be >= 1.0",
        ));
    }
    if config.transactions.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "transactions.poll_interval_ms",
            "must be > 0",
        ));
    }

    if config.history.max_blocks_scanned == 0 {
        errors.push(ValidationError::new(
            "history.max_blocks_scanned",
            "must be > 0",
        ));
    }
    if config.history.max_blocks_scanned > config.history.max_lookback_blocks {
        errors.push(ValidationError::new(
            "history.max_blocks_scanned",
            "must not exceed history.max_lookback_blocks",
        ));
    }

    if Url::parse(&config.aggregator.base_url).is_err() {
        errors.push(ValidationError::new(
            "aggregator.base_url",
            format!("invalid URL '{}'", config.aggregator.base_url),
        ));
    }

    for (key, over) in &config.networks {
        if !known.contains(&key.as_str()) {
            errors.push(ValidationError::new(
                format!("networks.{key}"),
                "unknown network",
            ));
        }
        let urls = over
            .rpc_url
            .iter()
            .chain(over.backup_urls.iter().flatten());
        for url in urls {
            if Url::parse(url).is_err() {
                errors.push(ValidationError::new(
                    format!("networks.{key}"),
                    format!("invalid RPC URL '{url}'"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
