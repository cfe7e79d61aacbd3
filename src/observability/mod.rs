//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (logging.rs installs the subscriber)
//!     → metrics.rs (counters, gauges, histograms through the `metrics` facade)
//!
//! Consumers:
//!     → stderr, pretty or JSON lines (stdout stays free for CLI output)
//!     → whatever recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder on its own
//! - Metric updates are cheap no-ops without a recorder

pub mod logging;
pub mod metrics;
