//! Wallet session layer — connection state machine, persistence, events.
//!
//! A session is the pairing of one wallet account with the running app. It is
//! created by an explicit user action (connect), survives reloads through the
//! [`store::SessionStore`] marker, and is destroyed by an explicit disconnect
//! or a provider-pushed revocation.

pub mod manager;
pub mod store;

pub use manager::SessionManager;
pub use store::{FileSessionStore, MemorySessionStore, PersistedSession, SessionStore};

use chrono::{DateTime, Utc};

use crate::shared::AccountAddress;

// ─── State ───────────────────────────────────────────────────────────────────

/// A live wallet connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    pub account: AccountAddress,
    /// Hex chain id, when the provider reported one.
    pub chain_id: Option<String>,
    pub last_synced_at: DateTime<Utc>,
}

/// Connection lifecycle state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// A wallet prompt is in flight.
    Connecting,
    Connected(WalletSession),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }

    pub fn session(&self) -> Option<&WalletSession> {
        match self {
            ConnectionState::Connected(session) => Some(session),
            _ => None,
        }
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `disconnect()` was called.
    UserRequested,
    /// The provider lost its connection to the chain.
    ProviderDropped,
    /// The wallet revoked access to every account.
    AccountsRevoked,
}

/// Session lifecycle notifications, fanned out to every subscriber.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connected(WalletSession),
    /// The wallet switched to a different account without disconnecting.
    AccountChanged {
        previous: AccountAddress,
        session: WalletSession,
    },
    ChainChanged { chain_id: String },
    Disconnected { reason: DisconnectReason },
}
