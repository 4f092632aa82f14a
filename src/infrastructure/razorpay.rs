use crate::config::RazorpayConfig;
use crate::domain::gateway::{GatewayError, Order, OrderRequest, Payment, PaymentSignature, Refund};
use crate::domain::ports::PaymentGateway;
use crate::infrastructure::signature;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// HTTP client for the Razorpay REST API.
///
/// Every request is authenticated with the key pair and bounded by the
/// configured timeout. Non-2xx answers are classified from the `error.code`
/// field of the response body, falling back to the HTTP status class.
pub struct RazorpayClient {
    base_url: String,
    key_id: String,
    key_secret: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    description: Option<String>,
}

impl RazorpayClient {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &RazorpayConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let resp = request
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Other(format!(
                        "gateway timeout after {} ms",
                        self.timeout.as_millis()
                    ))
                } else {
                    GatewayError::Other(format!("network error: {e}"))
                }
            })?;

        let status = resp.status();
        if status.is_success() {
            resp.json::<T>()
                .await
                .map_err(|e| GatewayError::Other(format!("undecodable gateway response: {e}")))
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(classify(status, &body))
        }
    }
}

fn classify(status: StatusCode, body: &str) -> GatewayError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);
    let description = parsed
        .as_ref()
        .and_then(|e| e.description.clone())
        .unwrap_or_else(|| body.chars().take(200).collect());
    let message = format!("HTTP {}: {}", status.as_u16(), description);

    match parsed.as_ref().and_then(|e| e.code.as_deref()) {
        Some("BAD_REQUEST_ERROR") => GatewayError::BadRequest(message),
        Some("GATEWAY_ERROR") => GatewayError::Gateway(message),
        Some("SERVER_ERROR") => GatewayError::Server(message),
        _ if status.is_client_error() => GatewayError::BadRequest(message),
        _ if status.is_server_error() => GatewayError::Server(message),
        _ => GatewayError::Other(message),
    }
}

/// Gateway ids are interpolated into URL paths, so only plain tokens pass.
fn path_segment(id: &str) -> Result<&str, GatewayError> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(id)
    } else {
        Err(GatewayError::BadRequest(format!("invalid gateway id {id:?}")))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, request: OrderRequest) -> Result<Order, GatewayError> {
        let body = json!({
            "amount": request.amount,
            "currency": request.currency,
            "receipt": request.receipt,
        });
        self.send(self.client.post(self.url("orders")).json(&body))
            .await
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<Payment, GatewayError> {
        let id = path_segment(payment_id)?;
        self.send(self.client.get(self.url(&format!("payments/{id}"))))
            .await
    }

    async fn refund_payment(&self, payment_id: &str, amount: i64) -> Result<Refund, GatewayError> {
        let id = path_segment(payment_id)?;
        let body = json!({ "amount": amount });
        self.send(
            self.client
                .post(self.url(&format!("payments/{id}/refund")))
                .json(&body),
        )
        .await
    }

    fn verify_payment_signature(&self, signature: &PaymentSignature) -> Result<(), GatewayError> {
        signature::verify(&self.key_secret, signature)
    }
}
