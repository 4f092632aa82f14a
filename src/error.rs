use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the checkout facade and its storage backends.
///
/// Callers match on the variant to decide between a retry, a failure page
/// or an alert; the message is only meant for logs.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Gateway error: {0}")]
    Gateway(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(
        "Transaction details mismatch for {txnid}: expected {expected_amount} {expected_currency}, \
         gateway reported {actual_amount} {actual_currency}"
    )]
    ReconciliationMismatch {
        txnid: String,
        expected_amount: i64,
        actual_amount: i64,
        expected_currency: String,
        actual_currency: String,
    },
    #[error("Payment not captured: {0}")]
    NotCaptured(String),
    #[error("Duplicate transaction: {0}")]
    Duplicate(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    pub(crate) fn amount_overflow(amount: Decimal) -> Self {
        Self::Validation(format!("Amount {amount} is out of range"))
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
