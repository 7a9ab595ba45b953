//! Native-asset balance reads.
//!
//! The service keeps the last successful read and only ever replaces it with
//! another successful read: a failed refresh reports the error and leaves the
//! previous value on display.

use std::sync::Arc;

use async_lock::RwLock;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::BalanceError;
use crate::network::NATIVE_ASSET;
use crate::provider::ProviderGateway;
use crate::shared::units::{parse_quantity, wei_to_eth};
use crate::shared::{fmt, AccountAddress};

/// One successful balance read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub asset: &'static str,
    /// Exact base-unit value as returned by the chain.
    pub wei: u128,
    /// Exact display-unit value (`wei / 10^18`).
    pub amount: Decimal,
    pub refreshed_at: DateTime<Utc>,
}

impl Balance {
    /// Render the amount using the shared display policy.
    pub fn display(&self) -> String {
        fmt::format_native_balance(&self.amount)
    }
}

/// Fetches and caches the connected account's native balance.
pub struct BalanceService {
    gateway: Arc<ProviderGateway>,
    current: RwLock<Option<Balance>>,
}

impl BalanceService {
    pub fn new(gateway: Arc<ProviderGateway>) -> Self {
        Self {
            gateway,
            current: RwLock::new(None),
        }
    }

    /// The last successful read, if any.
    pub async fn current(&self) -> Option<Balance> {
        self.current.read().await.clone()
    }

    /// Query the chain for `account`'s balance and store the result.
    ///
    /// On any failure the stored value is left untouched.
    pub async fn refresh(&self, account: &AccountAddress) -> Result<Balance, BalanceError> {
        let quantity = match self.gateway.balance_of(account).await {
            Ok(quantity) => quantity,
            Err(e) => {
                warn!(account = %account, error = %e, "balance refresh failed, keeping previous value");
                return Err(e.into());
            }
        };

        let wei = parse_quantity(&quantity)
            .map_err(|_| BalanceError::MalformedQuantity(quantity.clone()))?;
        let amount = wei_to_eth(wei).map_err(|_| BalanceError::OutOfRange(wei))?;

        let balance = Balance {
            asset: NATIVE_ASSET,
            wei,
            amount,
            refreshed_at: Utc::now(),
        };
        debug!(account = %account, amount = %amount, "balance refreshed");
        *self.current.write().await = Some(balance.clone());
        Ok(balance)
    }

    /// Forget the stored balance, forcing the next read to hit the chain.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }
}
