#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use common::{KEY_ID, KEY_SECRET, order_json, payment_json};
use rzpay::infrastructure::signature;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rzpay(base_url: &str, db_path: &Path, args: &[&str]) -> Output {
    Command::new(cargo_bin!("rzpay"))
        .env("RAZORPAY_BASE_URL", base_url)
        .env("RAZORPAY_API_KEY", KEY_ID)
        .env("RAZORPAY_API_SECRET", KEY_SECRET)
        .arg("--db-path")
        .arg(db_path)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn checkout_txnid(output: &Output) -> String {
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    printed["transaction"]["txnid"].as_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rocksdb_persistence_recovery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json("order_1", 10000, "INR", "r")))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let base_url = server.uri();

    let (checkout, listing) = tokio::task::spawn_blocking(move || {
        // 1. First run: start a checkout
        let checkout = rzpay(&base_url, &db_path, &["checkout", "--basket-id", "7", "--amount", "100"]);
        // 2. Second run: the transaction is still there
        let listing = rzpay(&base_url, &db_path, &["list"]);
        (checkout, listing)
    })
    .await
    .unwrap();

    let txnid = checkout_txnid(&checkout);
    assert!(listing.status.success());
    let stdout = String::from_utf8_lossy(&listing.stdout);
    assert!(stdout.contains(&format!("{txnid},7,100,INR")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_checkout_callback_and_refund_across_runs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json("order_1", 10000, "INR", "r")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(payment_json("pay_1", 10000, "INR", "captured")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/payments/pay_1/refund"))
        .and(body_json(json!({ "amount": 4000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "rfnd_1",
            "entity": "refund",
            "payment_id": "pay_1",
            "amount": 4000,
            "currency": "INR",
            "status": "processed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let db_path: PathBuf = dir.path().join("test_db");
    let base_url = server.uri();
    let sig = signature::sign(KEY_SECRET, "order_1", "pay_1").unwrap();

    let (first, second, callback, replay, refund, show) = tokio::task::spawn_blocking(move || {
        let first = rzpay(&base_url, &db_path, &["checkout", "--basket-id", "7", "--amount", "100"]);
        let second = rzpay(&base_url, &db_path, &["checkout", "--basket-id", "8", "--amount", "100"]);
        let txnid = checkout_txnid(&first);
        let other_txnid = checkout_txnid(&second);

        let callback_for = |txnid: &str| {
            rzpay(
                &base_url,
                &db_path,
                &[
                    "callback",
                    "--order-id",
                    "order_1",
                    "--payment-id",
                    "pay_1",
                    "--signature",
                    sig.as_str(),
                    "--txnid",
                    txnid,
                ],
            )
        };
        let callback = callback_for(&txnid);
        let replay = callback_for(&other_txnid);

        let refund = rzpay(
            &base_url,
            &db_path,
            &["refund", "--payment-id", "pay_1", "--amount", "4000", "--currency", "INR"],
        );
        let show = rzpay(&base_url, &db_path, &["show", "--txnid", &other_txnid]);
        (first, second, callback, replay, refund, show)
    })
    .await
    .unwrap();

    let txnid = checkout_txnid(&first);
    checkout_txnid(&second);

    assert!(callback.status.success(), "{}", String::from_utf8_lossy(&callback.stderr));
    let settled: Value = serde_json::from_slice(&callback.stdout).unwrap();
    assert_eq!(settled["txnid"], txnid.as_str());
    assert_eq!(settled["status"], "captured");
    assert_eq!(settled["rz_id"], "pay_1");
    assert_eq!(settled["payment_mode"], "upi");

    // The same signed payment cannot settle the second basket.
    assert!(!replay.status.success());
    assert!(String::from_utf8_lossy(&replay.stderr).contains("Duplicate"));

    assert!(refund.status.success(), "{}", String::from_utf8_lossy(&refund.stderr));
    let refunded: Value = serde_json::from_slice(&refund.stdout).unwrap();
    assert_eq!(refunded["refunded"], true);
    assert_eq!(refunded["amount"], 4000);

    assert!(show.status.success());
    let other: Value = serde_json::from_slice(&show.stdout).unwrap();
    assert!(other["rz_id"].is_null());
    assert!(other["status"].is_null());
}
