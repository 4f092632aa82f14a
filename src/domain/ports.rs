use super::gateway::{GatewayError, Order, OrderRequest, Payment, PaymentSignature, Refund};
use super::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for checkout transactions.
///
/// Records are keyed by `txnid` and can also be found by the gateway payment
/// id once reconciliation has assigned one.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a new record. Fails with `PaymentError::Duplicate` if the txnid is taken.
    async fn insert(&self, tx: Transaction) -> Result<()>;
    /// Overwrites an existing record (last write wins).
    async fn save(&self, tx: Transaction) -> Result<()>;
    async fn get(&self, txnid: &str) -> Result<Option<Transaction>>;
    async fn get_by_rz_id(&self, rz_id: &str) -> Result<Option<Transaction>>;
    async fn get_all(&self) -> Result<Vec<Transaction>>;
}

/// Client for the payment gateway's API.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> std::result::Result<Order, GatewayError>;
    async fn fetch_payment(&self, payment_id: &str) -> std::result::Result<Payment, GatewayError>;
    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: i64,
    ) -> std::result::Result<Refund, GatewayError>;
    fn verify_payment_signature(
        &self,
        signature: &PaymentSignature,
    ) -> std::result::Result<(), GatewayError>;
}

pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
