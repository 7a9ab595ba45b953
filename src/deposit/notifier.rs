//! Best-effort deposit announcements to the platform backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::http::PlatformBackend;
use crate::network::{NATIVE_ASSET, NETWORK_NAME, NOTIFY_SOURCE};
use crate::shared::serde_util::timestamp_ms;
use crate::shared::{AccountAddress, TxHash};

/// Wire body of the deposit-notification POST.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositNotification {
    pub uid: String,
    pub tx_hash: TxHash,
    /// Display units, serialized as a decimal string.
    pub amount: Decimal,
    pub coin: &'static str,
    pub from_address: AccountAddress,
    pub to_address: String,
    /// Submission time, epoch milliseconds on the wire.
    #[serde(with = "timestamp_ms")]
    pub timestamp: DateTime<Utc>,
    pub source: &'static str,
    pub network: &'static str,
}

impl DepositNotification {
    pub fn new(
        uid: &str,
        tx_hash: TxHash,
        amount: Decimal,
        from_address: &AccountAddress,
        to_address: &str,
    ) -> Self {
        Self {
            uid: uid.to_string(),
            tx_hash,
            amount,
            coin: NATIVE_ASSET,
            from_address: from_address.clone(),
            to_address: to_address.to_string(),
            timestamp: Utc::now(),
            source: NOTIFY_SOURCE,
            network: NETWORK_NAME,
        }
    }
}

/// Announces submitted deposits so the backend can credit them early.
///
/// Strictly best effort. The transaction is already on-chain by the time this
/// runs; a lost announcement only delays crediting until the backend's own
/// chain watcher catches up.
#[derive(Clone)]
pub struct DepositNotifier {
    backend: Arc<dyn PlatformBackend>,
    user_id: String,
}

impl DepositNotifier {
    pub fn new(backend: Arc<dyn PlatformBackend>, user_id: &str) -> Self {
        Self {
            backend,
            user_id: user_id.to_string(),
        }
    }

    /// Post the announcement. Failures are logged and swallowed: nothing
    /// here may alter the outcome of a submitted deposit.
    pub async fn notify(
        &self,
        tx_hash: &TxHash,
        amount: Decimal,
        from_address: &AccountAddress,
        to_address: &str,
    ) {
        let notification = DepositNotification::new(
            &self.user_id,
            tx_hash.clone(),
            amount,
            from_address,
            to_address,
        );
        match self.backend.push_deposit_notification(&notification).await {
            Ok(()) => {
                info!(tx_hash = %notification.tx_hash, "deposit notification delivered");
            }
            Err(e) => {
                warn!(tx_hash = %notification.tx_hash, error = %e, "deposit notification failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_lock::Mutex;
    use async_trait::async_trait;

    use crate::directory::AddressPayload;
    use crate::error::BackendError;

    use super::*;

    #[test]
    fn test_notification_wire_shape() {
        let notification = DepositNotification::new(
            "uid-7",
            "0xhash".into(),
            Decimal::new(5, 1),
            &"0xfrom".into(),
            "0xto",
        );
        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(json["uid"], "uid-7");
        assert_eq!(json["txHash"], "0xhash");
        assert_eq!(json["amount"], "0.5");
        assert_eq!(json["coin"], "ETH");
        assert_eq!(json["fromAddress"], "0xfrom");
        assert_eq!(json["toAddress"], "0xto");
        assert_eq!(json["source"], "metamask");
        assert_eq!(json["network"], "ethereum");
        assert!(json["timestamp"].is_i64());
    }

    struct FlakyBackend {
        notifications: Mutex<Vec<DepositNotification>>,
        fail: bool,
    }

    #[async_trait]
    impl PlatformBackend for FlakyBackend {
        async fn fetch_deposit_address(
            &self,
            _user_id: &str,
        ) -> Result<AddressPayload, BackendError> {
            Ok(AddressPayload::Bare(String::new()))
        }

        async fn push_deposit_notification(
            &self,
            notification: &DepositNotification,
        ) -> Result<(), BackendError> {
            if self.fail {
                return Err(BackendError::ServerError {
                    status: 500,
                    body: "boom".into(),
                });
            }
            self.notifications.lock().await.push(notification.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_notify_records_submission_details() {
        let backend = Arc::new(FlakyBackend {
            notifications: Mutex::new(Vec::new()),
            fail: false,
        });
        let notifier = DepositNotifier::new(backend.clone(), "uid-7");

        notifier
            .notify(&"0xhash".into(), Decimal::new(12, 1), &"0xfrom".into(), "0xto")
            .await;

        let sent = backend.notifications.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].uid, "uid-7");
        assert_eq!(sent[0].amount, Decimal::new(12, 1));
    }

    #[tokio::test]
    async fn test_backend_failure_is_swallowed() {
        let backend = Arc::new(FlakyBackend {
            notifications: Mutex::new(Vec::new()),
            fail: true,
        });
        let notifier = DepositNotifier::new(backend, "uid-7");

        // Returns unit either way; the caller cannot observe the failure.
        notifier
            .notify(&"0xhash".into(), Decimal::ONE, &"0xfrom".into(), "0xto")
            .await;
    }
}
