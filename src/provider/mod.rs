//! Injected-wallet provider layer — port trait, events, typed gateway.
//!
//! The provider implementation lives in the embedding application (a browser
//! extension bridge, a remote signer, a scripted fake in tests); the SDK only
//! sees the [`WalletProvider`] trait. [`ProviderGateway`] sits on top of it
//! and exposes one typed helper per JSON-RPC method the SDK consumes.

pub mod gateway;

pub use gateway::ProviderGateway;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::ProviderError;
use crate::shared::AccountAddress;

// ─── RPC surface ─────────────────────────────────────────────────────────────

pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const ETH_GAS_PRICE: &str = "eth_gasPrice";
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";

/// EIP-1193: the user rejected the request.
pub const CODE_USER_REJECTED: i64 = 4001;

/// JSON-RPC internal error; wallets raise it when the account cannot cover
/// value plus gas.
pub const CODE_INTERNAL_ERROR: i64 = -32603;

// ─── Events ──────────────────────────────────────────────────────────────────

/// Events pushed by the provider to the SDK.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// The exposed account list changed. An empty list means the user revoked
    /// access to every account.
    AccountsChanged(Vec<AccountAddress>),
    /// The wallet switched chains; payload is the new hex chain id.
    ChainChanged(String),
    /// The provider lost its connection to the chain.
    Disconnected { code: Option<i64>, message: String },
}

// ─── Port ────────────────────────────────────────────────────────────────────

/// The injected wallet provider, as the SDK sees it.
///
/// `connect` is the permission-prompting entry point (the extension-SDK
/// equivalent of `eth_requestAccounts`); everything else goes through the
/// opaque `request` passthrough. Implementations must be cheap to clone
/// receivers from: each `subscribe` call returns an independent event feed.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet to expose accounts. May open a permission prompt.
    async fn connect(&self) -> Result<Vec<AccountAddress>, ProviderError>;

    /// Issue a raw JSON-RPC-style request.
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError>;

    /// Subscribe to provider-pushed events.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

// ─── Transaction wire type ───────────────────────────────────────────────────

/// Parameter object for `eth_sendTransaction`.
///
/// All quantities are minimal lowercase hex strings; the wallet estimates
/// nothing because `gas` is always supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: AccountAddress,
    pub to: AccountAddress,
    pub value: String,
    pub gas: String,
    pub gas_price: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_request_wire_shape() {
        let tx = TransactionRequest {
            from: "0xaaa1".into(),
            to: "0xbbb2".into(),
            value: "0x6f05b59d3b20000".to_string(),
            gas: "0x5208".to_string(),
            gas_price: "0x3b9aca00".to_string(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["from"], "0xaaa1");
        assert_eq!(json["to"], "0xbbb2");
        assert_eq!(json["value"], "0x6f05b59d3b20000");
        assert_eq!(json["gas"], "0x5208");
        assert_eq!(json["gasPrice"], "0x3b9aca00");
        assert!(json.get("gas_price").is_none());
    }
}
