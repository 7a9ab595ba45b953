//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Balance error: {0}")]
    Balance(#[from] BalanceError),

    #[error("Deposit error: {0}")]
    Deposit(#[from] DepositError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Injected-provider errors.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// No injected wallet provider was detected. Fatal for the wallet
    /// feature, never for the host application.
    #[error("No wallet provider available")]
    Unavailable,

    /// Error object thrown by the provider, carried verbatim.
    #[error("Provider rejected {method}: code={code} {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    /// The provider answered with a shape the gateway cannot type.
    #[error("Unexpected response from {method}: {detail}")]
    UnexpectedResponse { method: String, detail: String },
}

impl ProviderError {
    /// Numeric code of the underlying RPC error object, if any.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            ProviderError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Session persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed session record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Session lifecycle errors.
///
/// Store failures never show up here: persistence is best effort, logged and
/// absorbed inside `SessionManager`.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The wallet prompt resolved without exposing any account.
    #[error("Wallet returned no accounts")]
    NoAccounts,
}

/// Platform backend (HTTP) errors.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Balance read errors. A failed refresh never clears the previously
/// stored balance.
#[derive(Error, Debug)]
pub enum BalanceError {
    #[error("Balance fetch failed: {0}")]
    Fetch(#[from] ProviderError),

    #[error("Malformed balance quantity {0:?}")]
    MalformedQuantity(String),

    #[error("Balance exceeds representable range: {0} wei")]
    OutOfRange(u128),
}

/// Deposit validation and submission errors.
#[derive(Error, Debug)]
pub enum DepositError {
    /// Not a failure: the UI should prompt for a wallet connection.
    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: have {available}, need {requested}")]
    InsufficientBalance {
        available: rust_decimal::Decimal,
        requested: rust_decimal::Decimal,
    },

    /// No current balance to validate against and a one-shot refresh
    /// also failed.
    #[error("Balance unavailable: {0}")]
    BalanceUnavailable(#[from] BalanceError),

    #[error("Deposit address unavailable")]
    AddressUnavailable,

    /// Provider code 4001. The entered amount is preserved for retry.
    #[error("Transaction was rejected by user")]
    UserRejected,

    /// Provider code -32603: the wallet holds too little to cover gas.
    #[error("Insufficient funds to cover gas")]
    InsufficientGasFunds,

    #[error("Provider error: {0}")]
    Provider(ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejection_message_is_exact() {
        assert_eq!(
            DepositError::UserRejected.to_string(),
            "Transaction was rejected by user"
        );
    }

    #[test]
    fn test_rpc_code_accessor() {
        let err = ProviderError::Rpc {
            method: "eth_sendTransaction".into(),
            code: 4001,
            message: "User denied transaction signature.".into(),
        };
        assert_eq!(err.rpc_code(), Some(4001));
        assert_eq!(ProviderError::Unavailable.rpc_code(), None);
    }

    #[test]
    fn test_layer_errors_convert_into_wallet_error() {
        let err: WalletError = ProviderError::Unavailable.into();
        assert!(matches!(err, WalletError::Provider(_)));

        let err: WalletError = SessionError::NoAccounts.into();
        assert!(matches!(err, WalletError::Session(_)));
    }
}
