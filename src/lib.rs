//! Chain Gateway Library
//!
//! One ephemeral software wallet connected to one of several EVM networks,
//! with every read and write routed through a failover RPC endpoint pool.
//!
//! ```text
//!                 ┌──────────────────────── Gateway ────────────────────────┐
//!   caller ──────▶│ wallet   tokens   balances   history   transactions swap │
//!                 └────┬────────┬────────┬─────────┬────────────┬────────┬───┘
//!                      │        │        │         │            │        │
//!                      ▼        ▼        ▼         ▼            ▼        ▼
//!                 ┌─────────────────────────────────────────┐  aggregator
//!                 │ rpc::EndpointPool (per-network failover) │  HTTP API
//!                 └─────────────────────────────────────────┘
//!                      ▲
//!                 network::NetworkRegistry (+ config overrides)
//! ```

// Core subsystems
pub mod gateway;
pub mod network;
pub mod rpc;
pub mod wallet;

// Chain operations
pub mod balances;
pub mod history;
pub mod swap;
pub mod tokens;
pub mod transactions;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;
pub mod units;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
