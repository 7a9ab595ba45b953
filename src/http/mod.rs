//! Platform backend layer — `PlatformHttp` with per-endpoint retry policies.
//!
//! Services above this layer depend on the [`PlatformBackend`] trait, never on
//! reqwest directly, so tests substitute a scripted backend.

pub mod client;
pub mod retry;

pub use client::PlatformHttp;
pub use retry::{RetryConfig, RetryPolicy};

use async_trait::async_trait;

use crate::deposit::DepositNotification;
use crate::directory::AddressPayload;
use crate::error::BackendError;

/// Port to the exchange backend.
#[async_trait]
pub trait PlatformBackend: Send + Sync {
    /// Look up the deposit address assigned to `user_id`.
    async fn fetch_deposit_address(&self, user_id: &str) -> Result<AddressPayload, BackendError>;

    /// Announce a submitted on-chain deposit so the backend can start
    /// watching for confirmations.
    async fn push_deposit_notification(
        &self,
        notification: &DepositNotification,
    ) -> Result<(), BackendError>;
}
