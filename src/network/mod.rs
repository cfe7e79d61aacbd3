//! Network registry subsystem.
//!
//! # Data Flow
//! ```text
//! builtin.rs (static network table)
//!     → registry.rs (+ config endpoint overrides)
//!     → Arc<NetworkDescriptor> handed to the endpoint pool, wallet and tokens
//! ```
//!
//! Pure data: descriptors are immutable once the registry is built.

pub mod builtin;
pub mod registry;
pub mod types;

pub use registry::NetworkRegistry;
pub use types::{ChainId, NativeToken, NetworkDescriptor, TokenDescriptor, NATIVE_TOKEN_ADDRESS};
