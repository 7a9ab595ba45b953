//! Cached deposit-address lookups with request coalescing.

use std::collections::HashMap;
use std::sync::Arc;

use async_lock::Mutex;
use tokio::sync::OnceCell;

use crate::error::BackendError;
use crate::http::PlatformBackend;

use super::{AddressSource, DepositAddress};

/// Per-user deposit-address cache.
///
/// Each user id owns one cell. The first `resolve` for an id performs the
/// backend request; callers arriving while that request is in flight await the
/// same cell and share its outcome, so the backend sees exactly one request
/// per id regardless of how many views ask at once.
pub struct AddressDirectory {
    backend: Arc<dyn PlatformBackend>,
    cells: Mutex<HashMap<String, Arc<OnceCell<DepositAddress>>>>,
}

impl AddressDirectory {
    pub fn new(backend: Arc<dyn PlatformBackend>) -> Self {
        Self {
            backend,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the deposit address for `user_id`.
    ///
    /// Successful lookups are cached for the lifetime of the directory (or
    /// until [`invalidate`](Self::invalidate)). Failed lookups cache nothing,
    /// so the next call retries. A backend answer with no address yet yields
    /// an unresolved [`DepositAddress`], also uncached.
    pub async fn resolve(&self, user_id: &str) -> Result<DepositAddress, BackendError> {
        let cell = {
            let mut cells = self.cells.lock().await;
            Arc::clone(cells.entry(user_id.to_string()).or_default())
        };

        if let Some(hit) = cell.get() {
            tracing::debug!(user_id, address = %hit.address, "deposit address served from cache");
            let mut hit = hit.clone();
            hit.source = AddressSource::Cache;
            return Ok(hit);
        }

        let fetched = cell
            .get_or_try_init(|| self.fetch(user_id))
            .await?
            .clone();

        if !fetched.is_resolved() {
            // Leave nothing behind for an unprovisioned user, so a later
            // resolve asks the backend again.
            self.invalidate(user_id).await;
        }
        Ok(fetched)
    }

    async fn fetch(&self, user_id: &str) -> Result<DepositAddress, BackendError> {
        let payload = self.backend.fetch_deposit_address(user_id).await?;
        let address = payload.normalize();
        if address.is_empty() {
            tracing::info!(user_id, "backend has no deposit address for user yet");
            return Ok(DepositAddress::unresolved());
        }
        tracing::debug!(user_id, %address, "deposit address fetched");
        Ok(DepositAddress::fetched(address))
    }

    /// Drop the cached address for one user.
    pub async fn invalidate(&self, user_id: &str) {
        self.cells.lock().await.remove(user_id);
    }

    /// Drop every cached address.
    pub async fn invalidate_all(&self) {
        self.cells.lock().await.clear();
    }
}
