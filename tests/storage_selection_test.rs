use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_db_path_without_rocksdb_feature_is_refused() {
    let mut cmd = Command::new(cargo_bin!("rzpay"));
    cmd.args(["--db-path", "some_db", "list"]);

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("storage-rocksdb"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_db_path_opens_rocksdb() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("rzpay"));
    cmd.env("RUST_LOG", "warn")
        .arg("--db-path")
        .arg(&db_path)
        .arg("list");

    cmd.assert().success().stdout(predicate::str::contains(
        "txnid,basket_id,amount,currency,status,rz_id,payment_mode,email,user_id",
    ));
    assert!(db_path.exists());
}

#[test]
fn test_stateful_commands_require_db_path() {
    for args in [
        vec!["list"],
        vec!["show", "--txnid", "abc"],
        vec!["capture", "--payment-id", "pay_1"],
        vec!["reconcile", "--payment-id", "pay_1", "--txnid", "abc"],
        vec!["refund", "--payment-id", "pay_1", "--amount", "100", "--currency", "INR"],
        vec![
            "callback",
            "--order-id",
            "order_1",
            "--payment-id",
            "pay_1",
            "--signature",
            "00",
            "--txnid",
            "abc",
        ],
    ] {
        let mut cmd = Command::new(cargo_bin!("rzpay"));
        // Nothing listens here; the command must stop before any request.
        cmd.env("RAZORPAY_BASE_URL", "http://127.0.0.1:9")
            .env("RAZORPAY_API_KEY", "rzp_test_key")
            .env("RAZORPAY_API_SECRET", "rzp_test_secret")
            .args(&args);

        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("db-path"));
    }
}
