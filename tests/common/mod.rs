#![allow(dead_code)]

use rzpay::config::RazorpayConfig;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const KEY_ID: &str = "rzp_test_key";
pub const KEY_SECRET: &str = "rzp_test_secret";

pub fn config_for(server: &MockServer) -> RazorpayConfig {
    RazorpayConfig {
        base_url: server.uri(),
        key_id: KEY_ID.to_string(),
        key_secret: KEY_SECRET.to_string(),
        timeout_ms: 1000,
    }
}

pub fn order_json(id: &str, amount: i64, currency: &str, receipt: &str) -> Value {
    json!({
        "id": id,
        "entity": "order",
        "amount": amount,
        "amount_paid": 0,
        "currency": currency,
        "receipt": receipt,
        "status": "created",
        "attempts": 0
    })
}

pub fn payment_json(id: &str, amount: i64, currency: &str, status: &str) -> Value {
    json!({
        "id": id,
        "entity": "payment",
        "amount": amount,
        "currency": currency,
        "status": status,
        "method": "upi",
        "order_id": "order_1",
        "captured": status == "captured"
    })
}

pub fn error_json(code: &str, description: &str) -> Value {
    json!({ "error": { "code": code, "description": description } })
}
