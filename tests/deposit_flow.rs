//! End-to-end deposit flow through the public client API.
//!
//! Everything runs against scripted doubles; no network, no real wallet.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::json;

use common::{client_with, FakeExchange, FakeWallet};
use walletgate::prelude::*;
use walletgate::provider::ETH_SEND_TRANSACTION;

async fn settle() {
    // Detached announcement tasks need a beat to run.
    tokio::time::sleep(Duration::from_millis(20)).await;
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deposit_half_an_eth_end_to_end() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    let client = client_with(&wallet, &exchange);

    client.connect().await.expect("connect");
    let intent = client.deposits().deposit("0.5").await.expect("deposit");

    assert_eq!(intent.status, DepositStatus::Submitted);
    assert_eq!(intent.tx_hash.as_ref().unwrap().as_str(), "0xhash01");
    assert_eq!(intent.amount, Some(Decimal::new(5, 1)));
    assert_eq!(intent.to_address.as_deref(), Some("0xDepo"));

    // The wallet received a fully specified transfer: nothing left for it
    // to estimate.
    let tx = &wallet.params_of(ETH_SEND_TRANSACTION)[0];
    assert_eq!(tx["from"], "0xF00");
    assert_eq!(tx["to"], "0xDepo");
    assert_eq!(tx["value"], "0x6f05b59d3b20000");
    assert_eq!(tx["gas"], "0x5208");
    assert_eq!(tx["gasPrice"], "0x3b9aca00");

    settle().await;
    let sent = exchange.notifications.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let wire = serde_json::to_value(&sent[0]).unwrap();
    assert_eq!(wire["uid"], "uid-7");
    assert_eq!(wire["txHash"], "0xhash01");
    assert_eq!(wire["amount"], "0.5");
    assert_eq!(wire["coin"], "ETH");
    assert_eq!(wire["fromAddress"], "0xF00");
    assert_eq!(wire["toAddress"], "0xDepo");
    assert_eq!(wire["source"], "metamask");
    assert_eq!(wire["network"], "ethereum");
    assert!(wire["timestamp"].is_i64());
}

#[tokio::test]
async fn deposit_before_connecting_prompts_instead_of_failing() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    let client = client_with(&wallet, &exchange);

    let err = client.deposits().deposit("0.5").await.unwrap_err();
    assert!(matches!(err, DepositError::NotConnected));
    assert!(client.deposits().current_intent().await.is_none());
    assert!(!wallet.saw(ETH_SEND_TRANSACTION));

    // Connecting unblocks the same submission.
    client.connect().await.unwrap();
    let intent = client.deposits().deposit("0.5").await.unwrap();
    assert_eq!(intent.status, DepositStatus::Submitted);
}

#[tokio::test]
async fn wallet_rejection_keeps_the_form_intact_for_retry() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    let client = client_with(&wallet, &exchange);
    client.connect().await.unwrap();

    wallet.script(
        ETH_SEND_TRANSACTION,
        Err(ProviderError::Rpc {
            method: ETH_SEND_TRANSACTION.to_string(),
            code: 4001,
            message: "User denied transaction signature.".into(),
        }),
    );
    let err = client.deposits().deposit("0.5").await.unwrap_err();
    assert!(matches!(err, DepositError::UserRejected));
    assert_eq!(err.to_string(), "Transaction was rejected by user");

    let intent = client.deposits().current_intent().await.unwrap();
    assert_eq!(intent.status, DepositStatus::Failed);
    assert_eq!(intent.amount_text, "0.5");
    assert_eq!(
        intent.failure.as_deref(),
        Some("Transaction was rejected by user")
    );

    settle().await;
    assert!(exchange.notifications.lock().unwrap().is_empty());

    // The user confirms on the second attempt.
    wallet.script(ETH_SEND_TRANSACTION, Ok(json!("0xhash02")));
    let retried = client.deposits().deposit(&intent.amount_text).await.unwrap();
    assert_eq!(retried.status, DepositStatus::Submitted);
    assert_eq!(retried.tx_hash.as_ref().unwrap().as_str(), "0xhash02");
}

#[tokio::test]
async fn overdrawn_amount_stops_before_the_wallet_prompt() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    let client = client_with(&wallet, &exchange);
    client.connect().await.unwrap();

    // The scripted account holds two ETH.
    let err = client.deposits().deposit("3").await.unwrap_err();
    assert!(matches!(err, DepositError::InsufficientBalance { .. }));
    assert!(!wallet.saw(ETH_SEND_TRANSACTION));
}

#[tokio::test]
async fn gas_shortfall_surfaces_as_typed_error() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    let client = client_with(&wallet, &exchange);
    client.connect().await.unwrap();

    wallet.script(
        ETH_SEND_TRANSACTION,
        Err(ProviderError::Rpc {
            method: ETH_SEND_TRANSACTION.to_string(),
            code: -32603,
            message: "insufficient funds for gas * price + value".into(),
        }),
    );
    let err = client.deposits().deposit("1.99").await.unwrap_err();
    assert!(matches!(err, DepositError::InsufficientGasFunds));
}

#[tokio::test]
async fn lost_notification_cannot_unsubmit_a_deposit() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    exchange.fail_notify_with(500);
    let client = client_with(&wallet, &exchange);
    client.connect().await.unwrap();

    let intent = client.deposits().deposit("0.5").await.unwrap();
    assert_eq!(intent.status, DepositStatus::Submitted);

    settle().await;
    assert!(exchange.notifications.lock().unwrap().is_empty());
    assert_eq!(
        client.deposits().current_intent().await.unwrap().status,
        DepositStatus::Submitted
    );
}

#[tokio::test]
async fn concurrent_address_lookups_hit_the_backend_once() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    let client = client_with(&wallet, &exchange);

    let directory = client.directory();
    let (a, b, c) = tokio::join!(
        directory.resolve("uid-7"),
        directory.resolve("uid-7"),
        directory.resolve("uid-7"),
    );
    for result in [a, b, c] {
        assert_eq!(result.unwrap().address, "0xDepo");
    }
    assert_eq!(exchange.address_fetches.load(Ordering::SeqCst), 1);

    // Later lookups stay cached.
    assert_eq!(
        directory.resolve("uid-7").await.unwrap().source,
        AddressSource::Cache
    );
    assert_eq!(exchange.address_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn backend_outage_blocks_deposit_but_recovers() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    exchange.fail_address_with(503);
    let client = client_with(&wallet, &exchange);
    client.connect().await.unwrap();

    let err = client.deposits().deposit("0.5").await.unwrap_err();
    assert!(matches!(err, DepositError::AddressUnavailable));

    // Outage over: the failed lookup was not cached, so the next attempt
    // fetches again and goes through.
    exchange.set_address("0xDepo");
    let intent = client.deposits().deposit("0.5").await.unwrap();
    assert_eq!(intent.status, DepositStatus::Submitted);
}

#[tokio::test]
async fn max_depositable_leaves_gas_headroom() {
    let wallet = FakeWallet::with_accounts(&["0xF00"]);
    let exchange = FakeExchange::with_address("0xDepo");
    let client = client_with(&wallet, &exchange);

    assert_eq!(client.deposits().max_depositable().await, None);

    client.connect().await.unwrap();
    // Two ETH on the account, 0.01 reserved for gas.
    assert_eq!(
        client.deposits().max_depositable().await,
        Some(Decimal::new(199, 2))
    );
}
