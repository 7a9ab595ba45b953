//! Typed adapter over the injected provider.
//!
//! One helper per JSON-RPC method the SDK consumes. The gateway decodes
//! response shapes and surfaces provider error objects untouched; it never
//! validates amounts or addresses — that belongs to the services above it.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use super::{
    ProviderEvent, TransactionRequest, WalletProvider, ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_GAS_PRICE,
    ETH_GET_BALANCE, ETH_SEND_TRANSACTION,
};
use crate::error::ProviderError;
use crate::shared::{AccountAddress, TxHash};

/// Thin typed wrapper around an optional injected provider.
///
/// When no provider was detected the gateway still constructs; every call
/// then fails with [`ProviderError::Unavailable`], which disables the wallet
/// feature without touching the rest of the application.
pub struct ProviderGateway {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl ProviderGateway {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self { provider }
    }

    /// Whether an injected provider was detected at construction.
    pub fn available(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>, ProviderError> {
        self.provider.as_ref().ok_or(ProviderError::Unavailable)
    }

    async fn typed<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ProviderError> {
        let raw = self.provider()?.request(method, params).await?;
        serde_json::from_value(raw).map_err(|e| ProviderError::UnexpectedResponse {
            method: method.to_string(),
            detail: e.to_string(),
        })
    }

    /// Ask the wallet to expose accounts. May open a permission prompt.
    pub async fn request_accounts(&self) -> Result<Vec<AccountAddress>, ProviderError> {
        self.provider()?.connect().await
    }

    /// Currently authorized accounts, without prompting.
    pub async fn accounts(&self) -> Result<Vec<AccountAddress>, ProviderError> {
        self.typed(ETH_ACCOUNTS, vec![]).await
    }

    /// Hex chain id of the wallet's current chain.
    pub async fn chain_id(&self) -> Result<String, ProviderError> {
        self.typed(ETH_CHAIN_ID, vec![]).await
    }

    /// Latest-block balance of `account` as the raw hex quantity.
    pub async fn balance_of(&self, account: &AccountAddress) -> Result<String, ProviderError> {
        self.typed(ETH_GET_BALANCE, vec![json!(account), json!("latest")])
            .await
    }

    /// Current gas price as the raw hex quantity.
    pub async fn gas_price(&self) -> Result<String, ProviderError> {
        self.typed(ETH_GAS_PRICE, vec![]).await
    }

    /// Hand a transfer to the wallet for signing and broadcast.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, ProviderError> {
        let param = serde_json::to_value(tx).map_err(|e| ProviderError::UnexpectedResponse {
            method: ETH_SEND_TRANSACTION.to_string(),
            detail: e.to_string(),
        })?;
        self.typed(ETH_SEND_TRANSACTION, vec![param]).await
    }

    /// Provider-pushed event feed.
    pub fn events(&self) -> Result<broadcast::Receiver<ProviderEvent>, ProviderError> {
        Ok(self.provider()?.subscribe())
    }
}
