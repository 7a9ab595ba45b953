//! High-level client — `WalletClient` with service accessors.
//!
//! Each concern has its own service module; this module keeps the builder,
//! the wiring between services, and the provider event pump.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::balance::BalanceService;
use crate::deposit::DepositOrchestrator;
use crate::directory::AddressDirectory;
use crate::error::WalletError;
use crate::http::{PlatformBackend, PlatformHttp};
use crate::provider::{ProviderGateway, WalletProvider};
use crate::session::{
    ConnectionState, MemorySessionStore, SessionEvent, SessionManager, SessionStore, WalletSession,
};
use crate::shared::AccountAddress;

/// The primary entry point for the walletgate SDK.
///
/// Owns one instance of every service and keeps them consistent: connecting
/// hydrates the balance and the deposit address, wallet events flow into the
/// session manager, disconnecting drops account-bound state.
#[derive(Clone)]
pub struct WalletClient {
    gateway: Arc<ProviderGateway>,
    session: Arc<SessionManager>,
    balances: Arc<BalanceService>,
    directory: Arc<AddressDirectory>,
    deposits: Arc<DepositOrchestrator>,
    user_id: String,
}

impl std::fmt::Debug for WalletClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletClient")
            .field("user_id", &self.user_id)
            .field("wallet_available", &self.gateway.available())
            .finish_non_exhaustive()
    }
}

impl WalletClient {
    pub fn builder() -> WalletClientBuilder {
        WalletClientBuilder::default()
    }

    // ── Service accessors ────────────────────────────────────────────────

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn balances(&self) -> &Arc<BalanceService> {
        &self.balances
    }

    pub fn directory(&self) -> &Arc<AddressDirectory> {
        &self.directory
    }

    pub fn deposits(&self) -> &Arc<DepositOrchestrator> {
        &self.deposits
    }

    /// Whether an injected wallet provider was detected. `false` disables
    /// the whole wallet feature; every other call degrades gracefully.
    pub fn wallet_available(&self) -> bool {
        self.gateway.available()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Restore a persisted session without prompting, then hydrate
    /// account-bound state when one came back.
    pub async fn restore(&self) -> Result<ConnectionState, WalletError> {
        let state = self.session.restore().await?;
        if let ConnectionState::Connected(session) = &state {
            self.hydrate(&session.account).await;
        }
        Ok(state)
    }

    /// Connect through the wallet prompt, then hydrate account-bound state.
    pub async fn connect(&self) -> Result<WalletSession, WalletError> {
        let session = self.session.connect().await?;
        self.hydrate(&session.account).await;
        Ok(session)
    }

    /// Drop the session and the account-bound caches: the balance and the
    /// deposit-address directory. The next connect re-fetches both.
    pub async fn disconnect(&self) {
        self.session.disconnect().await;
        self.balances.invalidate().await;
        self.directory.invalidate_all().await;
    }

    /// Best-effort prefetch after a session appears. Failures only cost the
    /// UI a loading state; each service retries on demand.
    async fn hydrate(&self, account: &AccountAddress) {
        if let Err(e) = self.balances.refresh(account).await {
            debug!(error = %e, "initial balance refresh failed");
        }
        if let Err(e) = self.directory.resolve(&self.user_id).await {
            debug!(error = %e, "deposit address prefetch failed");
        }
    }

    /// Spawn the task that feeds provider events into the session manager
    /// and keeps account-bound state in step.
    ///
    /// Call once after construction. The task ends when the provider drops
    /// its event channel.
    pub fn spawn_event_pump(&self) -> Result<JoinHandle<()>, WalletError> {
        let mut events = self.gateway.events()?;
        let session = self.session.clone();
        let balances = self.balances.clone();
        let directory = self.directory.clone();

        Ok(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let Some(outcome) = session.handle_provider_event(event).await else {
                            continue;
                        };
                        match outcome {
                            SessionEvent::AccountChanged { session, .. } => {
                                balances.invalidate().await;
                                directory.invalidate_all().await;
                                if let Err(e) = balances.refresh(&session.account).await {
                                    debug!(error = %e, "balance refresh after account switch failed");
                                }
                            }
                            SessionEvent::Disconnected { .. } => {
                                balances.invalidate().await;
                                directory.invalidate_all().await;
                            }
                            _ => {}
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "provider event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct WalletClientBuilder {
    base_url: String,
    api_key: Option<String>,
    user_id: Option<String>,
    provider: Option<Arc<dyn WalletProvider>>,
    session_store: Option<Arc<dyn SessionStore>>,
    backend: Option<Arc<dyn PlatformBackend>>,
}

impl Default for WalletClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            api_key: None,
            user_id: None,
            provider: None,
            session_store: None,
            backend: None,
        }
    }
}

impl WalletClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Exchange user the deposit address and notifications belong to.
    pub fn user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// The injected wallet provider, when one was detected. Omitting it
    /// builds a client with the wallet feature disabled.
    pub fn provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Where the session marker is persisted. Defaults to process memory.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Replace the HTTP backend, bypassing `base_url`/`api_key`. Intended
    /// for tests.
    pub fn backend(mut self, backend: Arc<dyn PlatformBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<WalletClient, WalletError> {
        let user_id = self
            .user_id
            .ok_or_else(|| WalletError::Config("user_id is required".to_string()))?;

        let backend: Arc<dyn PlatformBackend> = match self.backend {
            Some(backend) => backend,
            None => {
                let api_key = self
                    .api_key
                    .ok_or_else(|| WalletError::Config("api_key is required".to_string()))?;
                Arc::new(PlatformHttp::new(&self.base_url, &api_key))
            }
        };

        let gateway = Arc::new(ProviderGateway::new(self.provider));
        let store = self
            .session_store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let session = Arc::new(SessionManager::new(gateway.clone(), store));
        let balances = Arc::new(BalanceService::new(gateway.clone()));
        let directory = Arc::new(AddressDirectory::new(backend.clone()));
        let deposits = Arc::new(DepositOrchestrator::new(
            gateway.clone(),
            session.clone(),
            balances.clone(),
            directory.clone(),
            backend,
            &user_id,
        ));

        Ok(WalletClient {
            gateway,
            session,
            balances,
            directory,
            deposits,
            user_id,
        })
    }
}
