//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed RPC request may be tried on another endpoint
//! - Retry whole multi-call operations under an explicit [`RetryPolicy`]
//!
//! # Design Decisions
//! - Invalid input is never retried; only [`GatewayError::is_transient`] errors are
//! - Execution reverts and transaction validation rejections are deterministic,
//!   so they are not failed over
//! - Exponential mode adds up to 10% jitter to avoid synchronized retries

use std::future::Future;
use std::time::Duration;

use alloy::transports::{RpcError, TransportError};
use rand::Rng;

use crate::config::{BackoffKind, RetryConfig};
use crate::error::{GatewayError, GatewayResult};

/// Explicit retry policy for whole operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff: BackoffKind,
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            max_delay: delay,
            backoff: BackoffKind::Fixed,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff: config.backoff,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            BackoffKind::Fixed => self.base_delay,
            BackoffKind::Exponential => calculate_backoff(
                attempt,
                self.base_delay.as_millis() as u64,
                self.max_delay.as_millis() as u64,
            ),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Exponential backoff with jitter.
fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Run `op` until it succeeds, fails permanently, or the policy is exhausted.
///
/// The error of the last attempt is the one returned.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> GatewayResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = GatewayResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && e.is_transient() => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    operation = label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// How a single endpoint failure should be handled.
#[derive(Debug)]
pub(crate) enum Failure {
    /// Try the next endpoint.
    Failover(String),
    /// Surface immediately; another endpoint would answer the same.
    Fatal(GatewayError),
}

/// Transaction validation failures every node reports the same way.
const REJECTION_MARKERS: &[&str] = &[
    "insufficient funds",
    "nonce too low",
    "nonce too high",
    "intrinsic gas too low",
    "gas required exceeds allowance",
    "exceeds block gas limit",
    "transaction underpriced",
    "max fee per gas less than block base fee",
    "exceeds the configured cap",
    "invalid sender",
];

/// Classify a transport error from one endpoint.
pub(crate) fn classify(err: TransportError) -> Failure {
    match err {
        RpcError::ErrorResp(payload) if is_revert(payload.code, &payload.message) => {
            Failure::Fatal(GatewayError::Reverted(payload.message.to_string()))
        }
        RpcError::ErrorResp(payload) if is_rejection(payload.code, &payload.message) => {
            Failure::Fatal(GatewayError::Rejected(payload.message.to_string()))
        }
        other => Failure::Failover(other.to_string()),
    }
}

fn is_revert(code: i64, message: &str) -> bool {
    code == 3 || message.to_ascii_lowercase().contains("revert")
}

// -32000 is the generic server error, -32003 "transaction rejected", -32010 Parity's tx error.
fn is_rejection(code: i64, message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    matches!(code, -32000 | -32003 | -32010) && REJECTION_MARKERS.iter().any(|m| message.contains(m))
}
