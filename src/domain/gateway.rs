use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by a gateway client, classified the way the gateway does.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("gateway error: {0}")]
    Gateway(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("signature verification failed: {0}")]
    SignatureVerification(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Handle for an order created on the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Authoritative payment state as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub payment_id: String,
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// The three values the gateway appends to a successful checkout redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSignature {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}
