//! Shared test doubles: a scripted wallet and an in-memory exchange backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use walletgate::prelude::*;
use walletgate::provider::{ETH_CHAIN_ID, ETH_GAS_PRICE, ETH_GET_BALANCE, ETH_SEND_TRANSACTION};

/// Scripted injected wallet.
///
/// Fresh instances hold two ETH, sign every transfer as `0xhash01`, and sit
/// on mainnet. Individual methods are re-scripted per test.
pub struct FakeWallet {
    accounts: Mutex<Vec<AccountAddress>>,
    connect_error: Mutex<Option<ProviderError>>,
    responses: Mutex<HashMap<&'static str, Result<Value, ProviderError>>>,
    pub connect_calls: AtomicUsize,
    pub calls: Mutex<Vec<(String, Vec<Value>)>>,
    events: broadcast::Sender<ProviderEvent>,
}

impl FakeWallet {
    pub fn with_accounts(accounts: &[&str]) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        let wallet = Self {
            accounts: Mutex::new(accounts.iter().map(|a| (*a).into()).collect()),
            connect_error: Mutex::new(None),
            responses: Mutex::new(HashMap::new()),
            connect_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            events,
        };
        wallet.script(ETH_CHAIN_ID, Ok(json!("0x1")));
        wallet.script(ETH_GET_BALANCE, Ok(json!("0x1bc16d674ec80000")));
        wallet.script(ETH_GAS_PRICE, Ok(json!("0x3b9aca00")));
        wallet.script(ETH_SEND_TRANSACTION, Ok(json!("0xhash01")));
        Arc::new(wallet)
    }

    pub fn script(&self, method: &'static str, response: Result<Value, ProviderError>) {
        self.responses.lock().unwrap().insert(method, response);
    }

    /// Make the next `connect` calls fail, e.g. with a 4001 rejection.
    pub fn refuse_connect(&self, error: ProviderError) {
        *self.connect_error.lock().unwrap() = Some(error);
    }

    pub fn set_accounts(&self, accounts: &[&str]) {
        *self.accounts.lock().unwrap() = accounts.iter().map(|a| (*a).into()).collect();
    }

    pub fn push_event(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    pub fn saw(&self, method: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|(m, _)| m == method)
    }

    pub fn params_of(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .expect("method was never called")
    }

    pub fn as_provider(self: &Arc<Self>) -> Arc<dyn WalletProvider> {
        self.clone()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn connect(&self) -> Result<Vec<AccountAddress>, ProviderError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.connect_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        if method == "eth_accounts" {
            return Ok(json!(self.accounts.lock().unwrap().clone()));
        }
        self.responses
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or_else(|| {
                Err(ProviderError::Rpc {
                    method: method.to_string(),
                    code: -32601,
                    message: "not scripted".into(),
                })
            })
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// In-memory exchange backend with programmable failures.
pub struct FakeExchange {
    address: Mutex<Result<String, u16>>,
    notify_status: Mutex<Option<u16>>,
    pub address_fetches: AtomicUsize,
    pub notifications: Mutex<Vec<DepositNotification>>,
}

impl FakeExchange {
    pub fn with_address(address: &str) -> Arc<Self> {
        Arc::new(Self {
            address: Mutex::new(Ok(address.to_string())),
            notify_status: Mutex::new(None),
            address_fetches: AtomicUsize::new(0),
            notifications: Mutex::new(Vec::new()),
        })
    }

    /// Address lookups answer with the given HTTP status instead.
    pub fn fail_address_with(&self, status: u16) {
        *self.address.lock().unwrap() = Err(status);
    }

    pub fn set_address(&self, address: &str) {
        *self.address.lock().unwrap() = Ok(address.to_string());
    }

    /// Notification posts answer with the given HTTP status instead.
    pub fn fail_notify_with(&self, status: u16) {
        *self.notify_status.lock().unwrap() = Some(status);
    }

    pub fn as_backend(self: &Arc<Self>) -> Arc<dyn PlatformBackend> {
        self.clone()
    }
}

fn status_error(status: u16) -> BackendError {
    BackendError::ServerError {
        status,
        body: "scripted failure".to_string(),
    }
}

#[async_trait]
impl PlatformBackend for FakeExchange {
    async fn fetch_deposit_address(
        &self,
        _user_id: &str,
    ) -> Result<walletgate::directory::AddressPayload, BackendError> {
        self.address_fetches.fetch_add(1, Ordering::SeqCst);
        match &*self.address.lock().unwrap() {
            Ok(address) => Ok(walletgate::directory::AddressPayload::Bare(address.clone())),
            Err(status) => Err(status_error(*status)),
        }
    }

    async fn push_deposit_notification(
        &self,
        notification: &DepositNotification,
    ) -> Result<(), BackendError> {
        if let Some(status) = *self.notify_status.lock().unwrap() {
            return Err(status_error(status));
        }
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// A client wired to the given doubles, user `uid-7`.
pub fn client_with(wallet: &Arc<FakeWallet>, exchange: &Arc<FakeExchange>) -> WalletClient {
    WalletClient::builder()
        .user_id("uid-7")
        .provider(wallet.as_provider())
        .backend(exchange.as_backend())
        .build()
        .expect("client should build")
}
