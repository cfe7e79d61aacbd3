//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! RPC request through the endpoint pool:
//!     → per-attempt timeout (rpc.timeout_secs)
//!     → On failure: retries::classify (fail over or surface)
//!     → fixed failover delay, next endpoint
//!
//! Multi-call operation (connect, switch network):
//!     → retries::with_retry under a RetryPolicy
//! ```
//!
//! # Design Decisions
//! - One policy type applied uniformly instead of ad hoc loops at call sites
//! - No endpoint health memory: every call restarts from the primary

pub mod retries;

pub use retries::{with_retry, RetryPolicy};
