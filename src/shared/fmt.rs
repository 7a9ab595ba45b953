//! Display formatting for native-asset balances and wallet addresses.
//!
//! Rounding happens here and only here: stored amounts stay exact and are
//! rounded at the moment they are rendered.

use rust_decimal::prelude::*;
use std::sync::OnceLock;

static DUST_THRESHOLD: OnceLock<Decimal> = OnceLock::new();
static TEN: OnceLock<Decimal> = OnceLock::new();

fn get_dust_threshold() -> &'static Decimal {
    DUST_THRESHOLD.get_or_init(|| Decimal::new(1, 3))
}

fn get_ten() -> &'static Decimal {
    TEN.get_or_init(|| Decimal::from(10))
}

/// Format a native-asset balance for display.
///
/// Precision shrinks as magnitude grows:
///
/// | value            | rendering    |
/// |------------------|--------------|
/// | `0`              | `"0"`        |
/// | `(0, 0.001)`     | `"< 0.001"`  |
/// | `[0.001, 1)`     | 4 decimals   |
/// | `[1, 10)`        | 3 decimals   |
/// | `[10, …)`        | 2 decimals   |
pub fn format_native_balance(amount: &Decimal) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let abs = amount.abs();

    if abs < *get_dust_threshold() {
        return "< 0.001".to_string();
    }

    let decimals = if abs < Decimal::ONE {
        4
    } else if abs < *get_ten() {
        3
    } else {
        2
    };

    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.precision$}", rounded, precision = decimals as usize)
}

/// Middle-ellipsis form of a wallet address for UI labels: `0x1234...abcd`.
///
/// Inputs too short to abbreviate, or whose cut points would split a
/// multi-byte character, are returned unchanged.
pub fn abbreviate_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    match (address.get(..6), address.get(address.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{}...{}", head, tail),
        _ => address.to_string(),
    }
}
