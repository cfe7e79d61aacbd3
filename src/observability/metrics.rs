//! Metrics collection.
//!
//! # Metrics
//! - `gateway_rpc_attempts_total` (counter): endpoint attempts by network, outcome
//! - `gateway_rpc_failovers_total` (counter): moves to the next endpoint
//! - `gateway_rpc_latency_seconds` (histogram): per-attempt latency
//! - `gateway_endpoint_health` (gauge): 1=healthy, 0=unhealthy
//! - `gateway_history_blocks_scanned_total` (counter): blocks fetched by the scanner
//!
//! # Design Decisions
//! - Facade only: the embedding application installs a recorder if it wants one
//! - Without a recorder every call is a no-op

use std::time::Instant;

/// Outcome label of one endpoint attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Error,
    Timeout,
    Reverted,
}

impl AttemptOutcome {
    fn as_str(self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Error => "error",
            AttemptOutcome::Timeout => "timeout",
            AttemptOutcome::Reverted => "reverted",
        }
    }
}

/// Record one endpoint attempt and its latency.
pub fn record_rpc_attempt(network: &str, outcome: AttemptOutcome, start: Instant) {
    metrics::counter!(
        "gateway_rpc_attempts_total",
        "network" => network.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!("gateway_rpc_latency_seconds", "network" => network.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_failover(network: &str) {
    metrics::counter!("gateway_rpc_failovers_total", "network" => network.to_string()).increment(1);
}

/// Record endpoint health status.
pub fn record_endpoint_health(url: &str, healthy: bool) {
    metrics::gauge!("gateway_endpoint_health", "url" => url.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_blocks_scanned(network: &str, blocks: u64) {
    metrics::counter!(
        "gateway_history_blocks_scanned_total",
        "network" => network.to_string()
    )
    .increment(blocks);
}
