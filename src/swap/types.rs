//! Swap types.

use std::time::{Duration, Instant};

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;

/// A swap as the caller describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapRequest {
    /// Input token; the zero address means the native token.
    pub from_token: Address,
    pub to_token: Address,
    /// Decimal amount of `from_token`.
    pub amount: String,
    /// Decimals of `from_token`.
    pub decimals: u8,
}

/// Aggregator quote.
#[derive(Debug, Clone, Serialize)]
pub struct SwapQuote {
    pub request: SwapRequest,
    /// Registry key of the quoted network.
    pub network: String,
    pub amount_in_raw: U256,
    pub output_amount_raw: U256,
    pub estimated_gas: u64,
    /// Protocol names along the route.
    pub route: Vec<String>,
    #[serde(skip)]
    pub obtained_at: Instant,
}

impl SwapQuote {
    /// Whether the quote is younger than `ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.obtained_at.elapsed() < ttl
    }

    /// Fresh and made on `network`; otherwise it must be re-quoted before use.
    pub fn is_usable(&self, ttl: Duration, network: &str) -> bool {
        self.is_fresh(ttl) && self.network == network
    }
}

/// Result of executing a quote.
#[derive(Debug, Clone, Serialize)]
pub struct SwapExecution {
    pub tx_hash: TxHash,
    /// The quote the swap was executed against (fresh if re-quoted).
    pub quote: SwapQuote,
    pub requoted: bool,
    pub explorer_url: String,
}

/// Allowance state of the input token towards the aggregator router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Allowance {
    Sufficient,
    NeedsApproval { current: U256 },
}

impl Allowance {
    pub(crate) fn check(current: U256, required: U256) -> Self {
        if current >= required {
            Allowance::Sufficient
        } else {
            Allowance::NeedsApproval { current }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SwapRequest {
        SwapRequest {
            from_token: Address::ZERO,
            to_token: Address::repeat_byte(1),
            amount: "1".into(),
            decimals: 18,
        }
    }

    #[test]
    fn test_quote_freshness() {
        let quote = SwapQuote {
            request: request(),
            network: "ethereum".into(),
            amount_in_raw: U256::from(1u64),
            output_amount_raw: U256::from(2u64),
            estimated_gas: 0,
            route: vec![],
            obtained_at: Instant::now(),
        };
        assert!(quote.is_fresh(Duration::from_secs(30)));
        assert!(!quote.is_fresh(Duration::ZERO));
        assert!(quote.is_usable(Duration::from_secs(30), "ethereum"));
        assert!(!quote.is_usable(Duration::from_secs(30), "bsc"));
        assert!(!quote.is_usable(Duration::ZERO, "ethereum"));
    }

    #[test]
    fn test_allowance_check() {
        assert_eq!(Allowance::check(U256::from(10u64), U256::from(10u64)), Allowance::Sufficient);
        assert_eq!(
            Allowance::check(U256::from(9u64), U256::from(10u64)),
            Allowance::NeedsApproval { current: U256::from(9u64) }
        );
    }
}
