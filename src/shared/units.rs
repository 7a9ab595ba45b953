//! Pure conversion module for native-asset amounts between display units and wei.
//!
//! All math uses `rust_decimal::Decimal` for exact arithmetic; base-unit values
//! are `u128` since 10^18 wei per ETH overflows u64 above ~18.4 ETH.
//! No async, no network calls.

use std::fmt;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::network::NATIVE_DECIMALS;

/// Errors that can occur converting between display units and wei.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    NonPositiveAmount(String),
    FractionalWei { value: String },
    Overflow { context: String },
    InvalidQuantity { input: String, reason: String },
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitError::NonPositiveAmount(v) => write!(f, "Amount must be positive, got {}", v),
            UnitError::FractionalWei { value } => {
                write!(f, "Fractional wei not allowed: {}", value)
            }
            UnitError::Overflow { context } => write!(f, "Overflow: {}", context),
            UnitError::InvalidQuantity { input, reason } => {
                write!(f, "Invalid hex quantity '{}': {}", input, reason)
            }
        }
    }
}

impl std::error::Error for UnitError {}

fn wei_multiplier() -> Decimal {
    Decimal::from(10u64.pow(NATIVE_DECIMALS))
}

/// Convert a display-unit amount into wei.
///
/// ```text
/// wei = amount * 10^18
/// ```
///
/// Rejects non-positive amounts, fractional-wei remainders (inputs with more
/// than 18 decimal places) and anything that does not fit in u128.
pub fn eth_to_wei(amount: Decimal) -> Result<u128, UnitError> {
    if amount <= Decimal::ZERO {
        return Err(UnitError::NonPositiveAmount(amount.to_string()));
    }

    let wei = amount
        .checked_mul(wei_multiplier())
        .ok_or_else(|| UnitError::Overflow {
            context: format!("{} * 10^{}", amount, NATIVE_DECIMALS),
        })?;

    if wei.fract() != Decimal::ZERO {
        return Err(UnitError::FractionalWei {
            value: wei.to_string(),
        });
    }

    wei.to_u128().ok_or_else(|| UnitError::Overflow {
        context: format!("{} wei does not fit in u128", wei),
    })
}

/// Convert a wei amount into the exact display-unit decimal.
pub fn wei_to_eth(wei: u128) -> Result<Decimal, UnitError> {
    let signed = i128::try_from(wei).map_err(|_| UnitError::Overflow {
        context: format!("{} wei does not fit in i128", wei),
    })?;

    Decimal::try_from_i128_with_scale(signed, NATIVE_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|e| UnitError::Overflow {
            context: format!("{} wei: {}", wei, e),
        })
}

/// Encode a base-unit value as a minimal lowercase JSON-RPC hex quantity.
pub fn encode_quantity(value: u128) -> String {
    format!("{:#x}", value)
}

/// Parse a JSON-RPC hex quantity (`0x`-prefixed, prefix optional) into u128.
pub fn parse_quantity(input: &str) -> Result<u128, UnitError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(UnitError::InvalidQuantity {
            input: input.to_string(),
            reason: "empty".to_string(),
        });
    }

    u128::from_str_radix(digits, 16).map_err(|e| UnitError::InvalidQuantity {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
