//! Deposit flow — intents, transfer construction, submission, notification.

pub mod notifier;
pub mod orchestrator;

pub use notifier::{DepositNotification, DepositNotifier};
pub use orchestrator::DepositOrchestrator;

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::provider::TransactionRequest;
use crate::shared::units::encode_quantity;
use crate::shared::{AccountAddress, TxHash};

/// Gas limit for a plain native-asset transfer. Fixed by the EVM, so the
/// wallet is never asked to estimate.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Native-asset headroom left out of [`max_depositable`] so the transfer
/// itself can pay for gas.
pub fn gas_reserve() -> Decimal {
    static RESERVE: OnceLock<Decimal> = OnceLock::new();
    *RESERVE.get_or_init(|| Decimal::new(1, 2))
}

/// Largest amount worth offering in the UI: the balance minus the gas
/// reserve, floored at zero.
pub fn max_depositable(balance: Decimal) -> Decimal {
    (balance - gas_reserve()).max(Decimal::ZERO)
}

/// Parameter object for the wallet, built once validation has passed.
pub(crate) fn build_transfer(
    from: AccountAddress,
    to: AccountAddress,
    value_wei: u128,
    gas_price: String,
) -> TransactionRequest {
    TransactionRequest {
        from,
        to,
        value: encode_quantity(value_wei),
        gas: encode_quantity(TRANSFER_GAS_LIMIT as u128),
        gas_price,
    }
}

// ─── Intent ──────────────────────────────────────────────────────────────────

/// Where a deposit attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepositStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    Validating,
    Submitting,
    /// The wallet prompt is open; the user decides.
    AwaitingWalletConfirmation,
    /// The wallet broadcast the transaction. Terminal and irrevocable.
    Submitted,
    Failed,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Idle => "idle",
            DepositStatus::Validating => "validating",
            DepositStatus::Submitting => "submitting",
            DepositStatus::AwaitingWalletConfirmation => "awaiting_wallet_confirmation",
            DepositStatus::Submitted => "submitted",
            DepositStatus::Failed => "failed",
        }
    }
}

/// One deposit attempt, from the user's raw input to its terminal state.
///
/// `amount_text` keeps exactly what the user typed. It survives every failure
/// so the form never loses input over a rejected prompt.
#[derive(Debug, Clone)]
pub struct DepositIntent {
    pub id: Uuid,
    pub amount_text: String,
    /// Parsed amount, once validation got that far.
    pub amount: Option<Decimal>,
    pub asset: &'static str,
    pub from_address: AccountAddress,
    /// Resolved deposit address, once validation got that far.
    pub to_address: Option<String>,
    pub status: DepositStatus,
    pub tx_hash: Option<TxHash>,
    /// Human-readable reason when `status` is [`DepositStatus::Failed`].
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DepositIntent {
    pub(crate) fn new(amount_text: &str, from_address: AccountAddress) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount_text: amount_text.to_string(),
            amount: None,
            asset: crate::network::NATIVE_ASSET,
            from_address,
            to_address: None,
            status: DepositStatus::Validating,
            tx_hash: None,
            failure: None,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn fail(&mut self, reason: String) {
        self.status = DepositStatus::Failed;
        self.failure = Some(reason);
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            DepositStatus::Submitted | DepositStatus::Failed
        )
    }
}
