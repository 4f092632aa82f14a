use crate::domain::gateway::{GatewayError, PaymentSignature};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `"{order_id}|{payment_id}"` keyed with the API secret.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> Result<String, GatewayError> {
    let mut mac = new_mac(secret)?;
    mac.update(payload(order_id, payment_id).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a checkout-redirect signature in constant time.
pub fn verify(secret: &str, signature: &PaymentSignature) -> Result<(), GatewayError> {
    let expected = hex::decode(signature.signature.trim()).map_err(|_| {
        GatewayError::SignatureVerification(format!(
            "malformed signature for payment {}",
            signature.payment_id
        ))
    })?;

    let mut mac = new_mac(secret)?;
    mac.update(payload(&signature.order_id, &signature.payment_id).as_bytes());
    mac.verify_slice(&expected).map_err(|_| {
        GatewayError::SignatureVerification(format!(
            "signature mismatch for payment {}",
            signature.payment_id
        ))
    })
}

fn new_mac(secret: &str) -> Result<HmacSha256, GatewayError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Other(format!("invalid signing key: {e}")))
}

fn payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}
