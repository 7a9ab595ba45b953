//! # walletgate SDK
//!
//! A Rust SDK for the walletgate exchange: injected-wallet sessions and
//! on-chain native-asset deposits.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared newtypes, unit conversion, formatting, errors
//! 2. **Provider** — The injected wallet port and its typed gateway
//! 3. **HTTP API** — `PlatformHttp` with per-endpoint retry policies
//! 4. **Services** — Session, balance, address directory, deposit flow
//! 5. **High-Level Client** — `WalletClient` wiring the services together
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use walletgate::prelude::*;
//!
//! let client = WalletClient::builder()
//!     .api_key("...")
//!     .user_id("uid-7")
//!     .provider(detected_provider)
//!     .build()?;
//!
//! client.restore().await?;          // silent, no wallet prompt
//! let session = client.connect().await?;
//! let intent = client.deposits().deposit("0.5").await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes, unit conversion, display formatting.
pub mod shared;

/// Unified SDK error types.
pub mod error;

/// Network and asset constants.
pub mod network;

// ── Layer 2: Provider ────────────────────────────────────────────────────────

/// Injected wallet provider: port trait, events, typed gateway.
pub mod provider;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// Platform backend client with retry policies.
pub mod http;

// ── Layer 4: Services ────────────────────────────────────────────────────────

/// Wallet session state machine and persistence.
pub mod session;

/// On-chain balance reads and display formatting.
pub mod balance;

/// Deposit-address directory with per-user caching.
pub mod directory;

/// Deposit flow: validation, submission, notification.
pub mod deposit;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `WalletClient` — the primary entry point.
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{AccountAddress, TxHash};

    // Provider port + events
    pub use crate::provider::{
        ProviderEvent, ProviderGateway, TransactionRequest, WalletProvider,
    };

    // Session types
    pub use crate::session::{
        ConnectionState, DisconnectReason, FileSessionStore, MemorySessionStore, PersistedSession,
        SessionEvent, SessionManager, SessionStore, WalletSession,
    };

    // Balance + directory + deposit services
    pub use crate::balance::{Balance, BalanceService};
    pub use crate::deposit::{
        DepositIntent, DepositNotification, DepositOrchestrator, DepositStatus,
    };
    pub use crate::directory::{AddressDirectory, AddressSource, DepositAddress};

    // Errors
    pub use crate::error::{
        BackendError, BalanceError, DepositError, ProviderError, SessionError, WalletError,
    };

    // Network constants
    pub use crate::network::{DEFAULT_API_URL, NATIVE_ASSET, NETWORK_NAME};

    // HTTP client + backend port
    pub use crate::http::retry::{RetryConfig, RetryPolicy};
    pub use crate::http::{PlatformBackend, PlatformHttp};

    // High-level client
    pub use crate::client::{WalletClient, WalletClientBuilder};
}
