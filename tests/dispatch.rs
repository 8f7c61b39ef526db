//! Action flows end to end against mock adapter and wallet services.

mod common;

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{config_for, envelope, start_programmable_backend, MockBackend};
use hancock_sdk::dispatch::Callback;
use hancock_sdk::ledger::{RawTransaction, SignedTransaction};
use hancock_sdk::{
    Bitcoin, ErrorKind, Ethereum, HancockClient, HancockResult, InvokeOptions, PrivateKey, TxSigner,
};

const BTC_FROM: &str = "142kXJP52FjqVVBev7vi2YqK7pgwWuBCRx";
const BTC_TO: &str = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";
const ETH_FROM: &str = "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae";
const ETH_TO: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

/// Signer returning a fixed payload and counting its calls.
struct FixedSigner {
    calls: Arc<AtomicUsize>,
}

impl TxSigner for FixedSigner {
    fn sign(&self, _raw: &RawTransaction, _key: &PrivateKey) -> HancockResult<SignedTransaction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SignedTransaction("signed-payload".to_string()))
    }
}

async fn adapter() -> MockBackend {
    start_programmable_backend(|_req| async move {
        (200, envelope(json!({ "to": "0xraw", "nonce": 1 })))
    })
    .await
}

async fn wallet() -> MockBackend {
    start_programmable_backend(|_req| async move {
        (200, json!({ "result": { "code": 202, "description": "queued" } }).to_string())
    })
    .await
}

fn client_with_signer(adapter: &MockBackend, wallet: &MockBackend, calls: Arc<AtomicUsize>) -> HancockClient {
    HancockClient::with_ledgers(
        config_for(adapter.port(), wallet.port(), 1),
        Ethereum::default(),
        Bitcoin::with_signer(Arc::new(FixedSigner { calls })),
    )
}

#[tokio::test]
async fn test_transfer_with_private_key() {
    let adapter = adapter().await;
    let wallet = wallet().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let client = client_with_signer(&adapter, &wallet, calls.clone());

    let options = InvokeOptions::new().with_private_key("k");
    let response = client
        .bitcoin()
        .transfer(BTC_FROM, BTC_TO, "100", &options)
        .await
        .unwrap();

    let adapted = adapter.requests();
    assert_eq!(adapted.len(), 1);
    assert_eq!(adapted[0].method, "POST");
    assert_eq!(adapted[0].path, "/bitcoin/transfer");
    assert_eq!(
        adapted[0].body,
        json!({ "from": BTC_FROM, "to": BTC_TO, "value": "100", "data": "" })
    );

    let sent = wallet.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].path, "/bitcoin/send-signed-tx");
    assert_eq!(sent[0].body, json!({ "tx": "signed-payload" }));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(response["result"]["description"], "queued");
}

#[tokio::test]
async fn test_transfer_with_sign_provider() {
    let adapter = adapter().await;
    let wallet = wallet().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let client = client_with_signer(&adapter, &wallet, calls.clone());

    let options = InvokeOptions::new().with_sign_provider("P");
    client
        .bitcoin()
        .transfer(BTC_FROM, BTC_TO, "100", &options)
        .await
        .unwrap();

    assert_eq!(adapter.requests().len(), 1);
    let sent = wallet.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].path, "/bitcoin/sign-tx");
    assert_eq!(
        sent[0].body,
        json!({ "rawTx": { "to": "0xraw", "nonce": 1 }, "provider": "P" })
    );
    assert!(sent[0].header("vnd-hancock-request-id").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_provider_wins_over_private_key() {
    let adapter = adapter().await;
    let wallet = wallet().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let client = client_with_signer(&adapter, &wallet, calls.clone());

    let options = InvokeOptions::new()
        .with_private_key("k")
        .with_sign_provider("P")
        .with_callback(Callback::new("https://app.example/cb").with_request_id("req-42"));
    client
        .bitcoin()
        .transfer(BTC_FROM, BTC_TO, "5", &options)
        .await
        .unwrap();

    let sent = wallet.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].path, "/bitcoin/sign-tx");
    assert_eq!(sent[0].body["backUrl"], "https://app.example/cb");
    assert_eq!(sent[0].header("vnd-hancock-request-id"), Some("req-42"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_key_nor_provider_makes_no_request() {
    let adapter = adapter().await;
    let wallet = wallet().await;
    let client = client_with_signer(&adapter, &wallet, Arc::new(AtomicUsize::new(0)));
    let none = InvokeOptions::new();

    let results: Vec<HancockResult<Value>> = vec![
        client.bitcoin().transfer(BTC_FROM, BTC_TO, "1", &none).await,
        client.ethereum().transfer(ETH_FROM, ETH_TO, "1", &none).await,
        client
            .ethereum()
            .token_transfer(ETH_FROM, ETH_TO, "1", "tkn", &none)
            .await,
        client
            .ethereum()
            .invoke_smart_contract("ctr", "set", &[json!(1)], ETH_FROM, &none)
            .await,
    ];
    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoKeyNorProvider);
        assert_eq!(err.internal_code(), "SDKINT_50001");
    }

    assert!(adapter.requests().is_empty());
    assert!(wallet.requests().is_empty());
}

#[tokio::test]
async fn test_adapter_failure_skips_wallet() {
    let adapter = start_programmable_backend(|_req| async move {
        (
            500,
            json!({ "result": { "code": 50001, "description": "Cannot build transaction" } }).to_string(),
        )
    })
    .await;
    let wallet = wallet().await;
    let client = client_with_signer(&adapter, &wallet, Arc::new(AtomicUsize::new(0)));

    let err = client
        .bitcoin()
        .transfer(BTC_FROM, BTC_TO, "1", &InvokeOptions::new().with_sign_provider("P"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.message(), "Cannot build transaction");
    assert!(wallet.requests().is_empty());
}

#[tokio::test]
async fn test_balance_server_error_is_not_retried() {
    let adapter = start_programmable_backend(|_req| async move {
        (
            500,
            json!({ "result": { "code": 500, "description": "Ledger node unreachable" } }).to_string(),
        )
    })
    .await;
    let client = HancockClient::new(config_for(adapter.port(), 1, 1));

    let err = client.ethereum().get_balance(ETH_FROM).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.code(), 500);
    assert_eq!(err.internal_code(), "SDKAPI_500");
    assert_eq!(err.message(), "Ledger node unreachable");

    let requests = adapter.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, format!("/ethereum/balance/{}", ETH_FROM));
}

#[tokio::test]
async fn test_balance_success() {
    let adapter = start_programmable_backend(|_req| async move {
        (200, envelope(json!({ "balance": "1000000000000000000" })))
    })
    .await;
    let client = HancockClient::new(config_for(adapter.port(), 1, 1));

    let balance = client
        .ethereum()
        .get_balance("0xDE0B295669A9FD93D5F28D9EC85E40F4CB697BAE")
        .await
        .unwrap();
    assert_eq!(balance, "1000000000000000000");
    assert_eq!(adapter.requests()[0].path, format!("/ethereum/balance/{}", ETH_FROM));
}

#[tokio::test]
async fn test_ethereum_local_signing_end_to_end() {
    let adapter = start_programmable_backend(|_req| async move {
        (
            200,
            envelope(json!({
                "from": ETH_FROM,
                "to": ETH_TO,
                "value": "0x2710",
                "data": "",
                "gas": "0x5208",
                "gasPrice": "0x4a817c800",
                "nonce": "0x0",
                "chainId": 1
            })),
        )
    })
    .await;
    let wallet = wallet().await;
    let client = HancockClient::new(config_for(adapter.port(), wallet.port(), 1));

    let options = InvokeOptions::new()
        .with_private_key("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");
    client
        .ethereum()
        .transfer(ETH_FROM, ETH_TO, "10000", &options)
        .await
        .unwrap();

    let sent = wallet.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].path, "/ethereum/send-signed-tx");
    let tx = sent[0].body["tx"].as_str().unwrap();
    assert!(tx.starts_with("0x"));
}

#[tokio::test]
async fn test_contract_call_is_not_dispatched() {
    let adapter = start_programmable_backend(|_req| async move { (200, envelope(json!(["42"]))) }).await;
    let wallet = wallet().await;
    let client = HancockClient::new(config_for(adapter.port(), wallet.port(), 1));

    let data = client
        .ethereum()
        .call_smart_contract("my-contract", "get", &[], ETH_FROM)
        .await
        .unwrap();

    assert_eq!(data, json!(["42"]));
    let requests = adapter.requests();
    assert_eq!(requests[0].path, "/ethereum/smartcontract/my-contract");
    assert_eq!(requests[0].body["action"], "call");
    assert!(wallet.requests().is_empty());
}

#[tokio::test]
async fn test_token_allowance_body() {
    let adapter = adapter().await;
    let wallet = wallet().await;
    let client = HancockClient::new(config_for(adapter.port(), wallet.port(), 1));

    client
        .ethereum()
        .token_allowance(ETH_FROM, ETH_TO, ETH_FROM, "tkn", &InvokeOptions::new().with_sign_provider("P"))
        .await
        .unwrap();

    let requests = adapter.requests();
    assert_eq!(requests[0].path, "/ethereum/token/tkn/allowance");
    assert_eq!(
        requests[0].body,
        json!({ "from": ETH_FROM, "tokenOwner": ETH_TO, "spender": ETH_FROM })
    );
    assert_eq!(wallet.requests()[0].path, "/ethereum/sign-tx");
}

#[tokio::test]
async fn test_token_alias_stays_one_path_segment() {
    let adapter = adapter().await;
    let wallet = wallet().await;
    let client = HancockClient::new(config_for(adapter.port(), wallet.port(), 1));
    let options = InvokeOptions::new().with_sign_provider("P");

    for alias in ["gold/v2", "gold#v2", "gold?v2"] {
        client
            .ethereum()
            .token_transfer(ETH_FROM, ETH_TO, "1", alias, &options)
            .await
            .unwrap();
    }

    let paths: Vec<_> = adapter.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "/ethereum/token/gold%2Fv2/transfer",
            "/ethereum/token/gold%23v2/transfer",
            "/ethereum/token/gold%3Fv2/transfer",
        ]
    );
}
