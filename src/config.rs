use crate::error::{PaymentError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 2500;
pub const DEFAULT_CURRENCY: &str = "INR";

/// Credentials and transport settings for the gateway API.
#[derive(Clone, Debug)]
pub struct RazorpayConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub timeout_ms: u64,
}

impl RazorpayConfig {
    /// Fails when either half of the API key pair is missing.
    pub fn validate(&self) -> Result<()> {
        if self.key_id.trim().is_empty() {
            return Err(PaymentError::Config("RAZORPAY_API_KEY is not set".to_string()));
        }
        if self.key_secret.trim().is_empty() {
            return Err(PaymentError::Config(
                "RAZORPAY_API_SECRET is not set".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub razorpay: RazorpayConfig,
    /// Used when the basket does not carry its own currency.
    pub default_currency: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_ms = match lookup("RAZORPAY_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                PaymentError::Config(format!("RAZORPAY_TIMEOUT_MS must be an integer, got {raw:?}"))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            razorpay: RazorpayConfig {
                base_url: lookup("RAZORPAY_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                key_id: lookup("RAZORPAY_API_KEY").unwrap_or_default(),
                key_secret: lookup("RAZORPAY_API_SECRET").unwrap_or_default(),
                timeout_ms,
            },
            default_currency: lookup("RZPAY_DEFAULT_CURRENCY")
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}
