//! Deposit orchestration — validation, wallet submission, intent tracking.

use std::sync::Arc;

use async_lock::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::notifier::DepositNotifier;
use super::{build_transfer, max_depositable, DepositIntent, DepositStatus};
use crate::balance::BalanceService;
use crate::directory::AddressDirectory;
use crate::error::{DepositError, ProviderError};
use crate::http::PlatformBackend;
use crate::provider::{ProviderGateway, CODE_INTERNAL_ERROR, CODE_USER_REJECTED};
use crate::session::SessionManager;
use crate::shared::units::eth_to_wei;
use crate::shared::AccountAddress;

/// Drives a deposit from raw user input to a terminal intent.
///
/// Validation runs in a fixed order: session, amount, balance, deposit
/// address. The first miss stops the flow before the wallet prompt opens, so
/// the user is never asked to sign a transfer that cannot succeed.
pub struct DepositOrchestrator {
    gateway: Arc<ProviderGateway>,
    session: Arc<SessionManager>,
    balances: Arc<BalanceService>,
    directory: Arc<AddressDirectory>,
    notifier: DepositNotifier,
    user_id: String,
    intent: RwLock<Option<DepositIntent>>,
}

impl DepositOrchestrator {
    pub fn new(
        gateway: Arc<ProviderGateway>,
        session: Arc<SessionManager>,
        balances: Arc<BalanceService>,
        directory: Arc<AddressDirectory>,
        backend: Arc<dyn PlatformBackend>,
        user_id: &str,
    ) -> Self {
        Self {
            gateway,
            session,
            balances,
            directory,
            notifier: DepositNotifier::new(backend, user_id),
            user_id: user_id.to_string(),
            intent: RwLock::new(None),
        }
    }

    /// The tracked intent, newest submission first-class.
    pub async fn current_intent(&self) -> Option<DepositIntent> {
        self.intent.read().await.clone()
    }

    /// Status of the tracked intent, [`DepositStatus::Idle`] when none.
    pub async fn status(&self) -> DepositStatus {
        self.intent
            .read()
            .await
            .as_ref()
            .map(|i| i.status)
            .unwrap_or_default()
    }

    /// Forget the tracked intent so the UI starts from a clean form.
    pub async fn reset(&self) {
        *self.intent.write().await = None;
    }

    /// Largest amount the UI should offer, given the last known balance.
    pub async fn max_depositable(&self) -> Option<Decimal> {
        let balance = self.balances.current().await?;
        Some(max_depositable(balance.amount))
    }

    /// Run one deposit attempt end to end.
    ///
    /// Returns the terminal intent on success. On failure the tracked intent
    /// carries the reason and keeps `amount_text`, except when no wallet
    /// session exists: that is a prompt-to-connect, not a failed deposit, and
    /// nothing is tracked.
    pub async fn deposit(&self, amount_text: &str) -> Result<DepositIntent, DepositError> {
        let Some(session) = self.session.session().await else {
            debug!("deposit attempted without a wallet session");
            return Err(DepositError::NotConnected);
        };

        let mut intent = DepositIntent::new(amount_text, session.account.clone());
        *self.intent.write().await = Some(intent.clone());

        let Some(amount) = parse_amount(amount_text) else {
            let error = DepositError::InvalidAmount(amount_text.trim().to_string());
            return Err(self.fail(&mut intent, error).await);
        };
        intent.amount = Some(amount);
        self.publish(&intent).await;

        let balance = match self.balances.current().await {
            Some(balance) => balance,
            None => match self.balances.refresh(&session.account).await {
                Ok(balance) => balance,
                Err(e) => {
                    return Err(self.fail(&mut intent, DepositError::BalanceUnavailable(e)).await)
                }
            },
        };
        if amount > balance.amount {
            let error = DepositError::InsufficientBalance {
                available: balance.amount,
                requested: amount,
            };
            return Err(self.fail(&mut intent, error).await);
        }

        let to_address = match self.directory.resolve(&self.user_id).await {
            Ok(resolved) if resolved.is_resolved() => resolved.address,
            Ok(_) => return Err(self.fail(&mut intent, DepositError::AddressUnavailable).await),
            Err(e) => {
                warn!(error = %e, "deposit address lookup failed");
                return Err(self.fail(&mut intent, DepositError::AddressUnavailable).await);
            }
        };
        intent.to_address = Some(to_address.clone());
        intent.status = DepositStatus::Submitting;
        self.publish(&intent).await;

        let value_wei = match eth_to_wei(amount) {
            Ok(wei) => wei,
            Err(e) => {
                debug!(error = %e, "amount not representable in wei");
                let error = DepositError::InvalidAmount(amount_text.trim().to_string());
                return Err(self.fail(&mut intent, error).await);
            }
        };
        let gas_price = match self.gateway.gas_price().await {
            Ok(price) => price,
            Err(e) => return Err(self.fail(&mut intent, map_wallet_error(e)).await),
        };
        let tx = build_transfer(
            session.account.clone(),
            AccountAddress::new(&to_address),
            value_wei,
            gas_price,
        );

        intent.status = DepositStatus::AwaitingWalletConfirmation;
        self.publish(&intent).await;

        match self.gateway.send_transaction(&tx).await {
            Ok(tx_hash) => {
                intent.status = DepositStatus::Submitted;
                intent.tx_hash = Some(tx_hash.clone());
                self.publish(&intent).await;
                info!(tx_hash = %tx_hash, amount = %amount, "deposit submitted");

                // The announcement must not delay or fail the submission.
                let notifier = self.notifier.clone();
                let from_address = session.account.clone();
                tokio::spawn(async move {
                    notifier
                        .notify(&tx_hash, amount, &from_address, &to_address)
                        .await;
                });

                Ok(intent)
            }
            Err(e) => Err(self.fail(&mut intent, map_wallet_error(e)).await),
        }
    }

    async fn fail(&self, intent: &mut DepositIntent, error: DepositError) -> DepositError {
        warn!(intent = %intent.id, error = %error, status = intent.status.as_str(), "deposit failed");
        intent.fail(error.to_string());
        self.publish(intent).await;
        error
    }

    /// Mirror the working copy into the tracked slot, unless a newer
    /// submission already took it over.
    async fn publish(&self, intent: &DepositIntent) {
        let mut slot = self.intent.write().await;
        if slot.as_ref().map(|i| i.id) == Some(intent.id) {
            *slot = Some(intent.clone());
        }
    }
}

fn parse_amount(text: &str) -> Option<Decimal> {
    let amount = text.trim().parse::<Decimal>().ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}

/// Wallet error objects carry intent in their codes; surface the two the UI
/// must distinguish.
fn map_wallet_error(error: ProviderError) -> DepositError {
    match error.rpc_code() {
        Some(CODE_USER_REJECTED) => DepositError::UserRejected,
        Some(CODE_INTERNAL_ERROR) => DepositError::InsufficientGasFunds,
        _ => DepositError::Provider(error),
    }
}
