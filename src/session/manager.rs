//! Session state machine — restore, connect, disconnect, provider events.

use std::sync::Arc;

use async_lock::RwLock;
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::store::{PersistedSession, SessionStore};
use super::{ConnectionState, DisconnectReason, SessionEvent, WalletSession};
use crate::error::SessionError;
use crate::provider::{ProviderEvent, ProviderGateway};
use crate::shared::AccountAddress;

const EVENT_CAPACITY: usize = 64;

/// Owns the wallet connection state.
///
/// All transitions run through this type: explicit calls (`restore`,
/// `connect`, `disconnect`) and provider-pushed events
/// ([`SessionManager::handle_provider_event`]). Observers subscribe via
/// [`SessionManager::subscribe`] or [`SessionManager::events`].
pub struct SessionManager {
    gateway: Arc<ProviderGateway>,
    store: Arc<dyn SessionStore>,
    state: RwLock<ConnectionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(gateway: Arc<ProviderGateway>, store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            gateway,
            store,
            state: RwLock::new(ConnectionState::Disconnected),
            events,
        }
    }

    /// Snapshot of the current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    /// The live session, when connected.
    pub async fn session(&self) -> Option<WalletSession> {
        self.state.read().await.session().cloned()
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.is_connected()
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Session lifecycle events as a stream. Lagging receivers skip ahead
    /// instead of erroring.
    pub fn events(&self) -> impl futures_util::Stream<Item = SessionEvent> {
        let mut rx = self.events.subscribe();
        async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "session event receiver lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    /// Restore a previous session without prompting.
    ///
    /// Reads the persisted marker and re-validates it against the wallet's
    /// currently authorized accounts (`eth_accounts`). A marker the wallet no
    /// longer backs is cleared. Never opens a wallet prompt, and calling it
    /// again after a successful restore is a no-op.
    pub async fn restore(&self) -> Result<ConnectionState, SessionError> {
        let current = self.state.read().await.clone();
        if current.is_connected() {
            return Ok(current);
        }

        let persisted = match self.store.load().await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "persisted session unreadable, discarding");
                self.persist_clear().await;
                None
            }
        };

        let Some(record) = persisted else {
            return Ok(ConnectionState::Disconnected);
        };
        if !record.connected || record.account.is_empty() {
            return Ok(ConnectionState::Disconnected);
        }

        let accounts = self.gateway.accounts().await?;
        match accounts.iter().find(|a| a.matches(&record.account)) {
            Some(account) => {
                info!(account = %account, "wallet session restored");
                let session = self.establish(account.clone()).await;
                Ok(ConnectionState::Connected(session))
            }
            None => {
                debug!(account = %record.account, "persisted account no longer authorized");
                self.persist_clear().await;
                Ok(ConnectionState::Disconnected)
            }
        }
    }

    /// Connect through the wallet prompt.
    ///
    /// When a session is already live, returns it without prompting again.
    pub async fn connect(&self) -> Result<WalletSession, SessionError> {
        if let Some(session) = self.session().await {
            return Ok(session);
        }

        *self.state.write().await = ConnectionState::Connecting;

        let accounts = match self.gateway.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                *self.state.write().await = ConnectionState::Disconnected;
                return Err(e.into());
            }
        };

        let Some(account) = accounts.into_iter().next() else {
            *self.state.write().await = ConnectionState::Disconnected;
            return Err(SessionError::NoAccounts);
        };

        info!(account = %account, "wallet connected");
        Ok(self.establish(account).await)
    }

    /// Drop the session and its persisted marker.
    ///
    /// Wallet permissions are left alone: the provider keeps the account
    /// authorized and only this app forgets it.
    pub async fn disconnect(&self) {
        let was_connected = {
            let mut state = self.state.write().await;
            let was = state.is_connected();
            *state = ConnectionState::Disconnected;
            was
        };
        self.persist_clear().await;
        if was_connected {
            info!("wallet disconnected");
            self.emit(SessionEvent::Disconnected {
                reason: DisconnectReason::UserRequested,
            });
        }
    }

    /// Apply one provider-pushed event and return the session event it
    /// produced, if any.
    pub async fn handle_provider_event(&self, event: ProviderEvent) -> Option<SessionEvent> {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts).await,
            ProviderEvent::ChainChanged(chain_id) => self.on_chain_changed(chain_id).await,
            ProviderEvent::Disconnected { code, message } => {
                self.on_provider_disconnected(code, message).await
            }
        }
    }

    async fn on_accounts_changed(&self, accounts: Vec<AccountAddress>) -> Option<SessionEvent> {
        let head = accounts.into_iter().next().filter(|a| !a.is_empty());

        let Some(head) = head else {
            // Access revoked. The session is invalid and must not be kept,
            // in memory or on disk.
            let had_session = {
                let mut state = self.state.write().await;
                let had = state.is_connected();
                *state = ConnectionState::Disconnected;
                had
            };
            self.persist_clear().await;
            if !had_session {
                return None;
            }
            info!("wallet access revoked");
            return Some(self.emit(SessionEvent::Disconnected {
                reason: DisconnectReason::AccountsRevoked,
            }));
        };

        let swapped = {
            let mut state = self.state.write().await;
            let ConnectionState::Connected(session) = &mut *state else {
                return None;
            };

            if session.account.matches(&head) {
                session.last_synced_at = Utc::now();
                return None;
            }

            let previous = std::mem::replace(&mut session.account, head.clone());
            session.last_synced_at = Utc::now();
            (previous, session.clone())
        };

        let (previous, session) = swapped;
        self.persist(&head).await;
        info!(previous = %previous, account = %head, "wallet account switched");
        Some(self.emit(SessionEvent::AccountChanged { previous, session }))
    }

    async fn on_chain_changed(&self, chain_id: String) -> Option<SessionEvent> {
        {
            let mut state = self.state.write().await;
            let ConnectionState::Connected(session) = &mut *state else {
                return None;
            };
            session.chain_id = Some(chain_id.clone());
            session.last_synced_at = Utc::now();
        }
        debug!(chain_id = %chain_id, "chain switched");
        Some(self.emit(SessionEvent::ChainChanged { chain_id }))
    }

    async fn on_provider_disconnected(
        &self,
        code: Option<i64>,
        message: String,
    ) -> Option<SessionEvent> {
        {
            let mut state = self.state.write().await;
            if !state.is_connected() {
                return None;
            }
            *state = ConnectionState::Disconnected;
        }
        // The persisted marker survives a transport drop; the next restore
        // re-validates it against the wallet.
        warn!(?code, message = %message, "provider disconnected");
        Some(self.emit(SessionEvent::Disconnected {
            reason: DisconnectReason::ProviderDropped,
        }))
    }

    async fn establish(&self, account: AccountAddress) -> WalletSession {
        let chain_id = match self.gateway.chain_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(error = %e, "chain id unavailable");
                None
            }
        };
        let session = WalletSession {
            account: account.clone(),
            chain_id,
            last_synced_at: Utc::now(),
        };
        *self.state.write().await = ConnectionState::Connected(session.clone());
        self.persist(&account).await;
        self.emit(SessionEvent::Connected(session.clone()));
        session
    }

    async fn persist(&self, account: &AccountAddress) {
        let record = PersistedSession::new(account.clone());
        if let Err(e) = self.store.save(&record).await {
            warn!(error = %e, "failed to persist session");
        }
    }

    async fn persist_clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear persisted session");
        }
    }

    fn emit(&self, event: SessionEvent) -> SessionEvent {
        let _ = self.events.send(event.clone());
        event
    }
}
