//! Human-readable amount conversion.

use alloy::primitives::utils::parse_units;
use alloy::primitives::U256;

use crate::error::{GatewayError, GatewayResult, InputKind};

/// Decimal places shown in balance listings.
pub const DISPLAY_DECIMALS: usize = 6;

/// Parse a decimal string such as `"1.5"` into the token's smallest unit.
pub fn parse_amount(amount: &str, decimals: u8) -> GatewayResult<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::invalid(InputKind::Amount, "empty amount"));
    }
    if trimmed.starts_with('-') {
        return Err(GatewayError::invalid(InputKind::Amount, "amount must not be negative"));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((_, "")) => {
            return Err(GatewayError::invalid(
                InputKind::Amount,
                format!("'{trimmed}' has no digits after the decimal point"),
            ));
        }
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (trimmed, ""),
    };
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayError::invalid(
            InputKind::Amount,
            format!("'{trimmed}' is not a decimal number"),
        ));
    }
    if frac_part.len() > decimals as usize {
        return Err(GatewayError::invalid(
            InputKind::Amount,
            format!("more than {decimals} decimal places"),
        ));
    }

    let normalized = if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    };
    parse_units(&normalized, decimals)
        .map(|parsed| parsed.get_absolute())
        .map_err(|e| GatewayError::invalid(InputKind::Amount, e.to_string()))
}

/// Exact decimal rendering with trailing zeros trimmed (`"1.5"`, `"2.0"`).
pub fn format_amount(raw: U256, decimals: u8) -> String {
    let (int_part, frac_part) = split_digits(raw, decimals as usize);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{int_part}.0")
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Fixed-point rendering rounded half-up to `places` decimals.
pub fn format_display(raw: U256, decimals: u8, places: usize) -> String {
    let decimals = decimals as usize;
    let scaled = if decimals <= places {
        raw
    } else {
        match U256::from(10u8).checked_pow(U256::from(decimals - places)) {
            Some(scale) => {
                let (quotient, remainder) = raw.div_rem(scale);
                if remainder.saturating_mul(U256::from(2u8)) >= scale {
                    quotient.saturating_add(U256::from(1u8))
                } else {
                    quotient
                }
            }
            None => U256::ZERO,
        }
    };

    let (int_part, frac_part) = split_digits(scaled, decimals.min(places));
    if places == 0 {
        return int_part;
    }
    format!("{int_part}.{frac_part:0<places$}")
}

fn split_digits(raw: U256, decimals: usize) -> (String, String) {
    let digits = raw.to_string();
    if decimals == 0 {
        return (digits, String::new());
    }
    if digits.len() <= decimals {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
        (int_part.to_string(), frac_part.to_string())
    }
}
