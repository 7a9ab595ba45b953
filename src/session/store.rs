//! Session persistence port and the bundled stores.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::shared::serde_util::bool_str;
use crate::shared::AccountAddress;

/// The persisted connection marker.
///
/// Field names mirror the legacy key-value slots (`metamask_connected` holds
/// the string `"true"`, `metamask_account` the address), so documents written
/// by earlier front ends stay readable after a storage-backend swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(rename = "metamask_connected", with = "bool_str")]
    pub connected: bool,
    #[serde(rename = "metamask_account")]
    pub account: AccountAddress,
}

impl PersistedSession {
    pub fn new(account: AccountAddress) -> Self {
        Self {
            connected: true,
            account,
        }
    }
}

/// Where the connection marker lives between runs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<PersistedSession>, StoreError>;
    async fn save(&self, record: &PersistedSession) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

// ─── MemorySessionStore ──────────────────────────────────────────────────────

/// In-memory store. Sessions do not survive a restart; useful as a default
/// and in tests.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: async_lock::RwLock<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, record: &PersistedSession) -> Result<(), StoreError> {
        *self.slot.write().await = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write().await = None;
        Ok(())
    }
}

// ─── FileSessionStore ────────────────────────────────────────────────────────

/// Single-JSON-document store on disk.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, record: &PersistedSession) -> Result<(), StoreError> {
        let body = serde_json::to_string(record).map_err(StoreError::Malformed)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());

        let record = PersistedSession::new("0xabc123".into());
        store.save(&record).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(record));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert!(store.load().await.unwrap().is_none());

        let record = PersistedSession::new("0xabc123".into());
        store.save(&record).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(record));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_document_keeps_legacy_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);

        store
            .save(&PersistedSession::new("0xabc123".into()))
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            raw,
            "{\"metamask_connected\":\"true\",\"metamask_account\":\"0xabc123\"}"
        );
    }

    #[tokio::test]
    async fn test_file_store_surfaces_corrupt_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(StoreError::Malformed(_))
        ));
    }
}
