use crate::domain::gateway::{GatewayError, Order, OrderRequest, Payment, PaymentSignature, Refund};
use crate::domain::ports::PaymentGateway;
use crate::infrastructure::signature;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call observed by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CreateOrder(OrderRequest),
    FetchPayment(String),
    Refund { payment_id: String, amount: i64 },
    VerifySignature(PaymentSignature),
}

#[derive(Default)]
struct MockState {
    payments: HashMap<String, Payment>,
    failure: Option<GatewayError>,
    calls: Vec<GatewayCall>,
    orders_created: usize,
}

/// In-process gateway double that records every call.
///
/// Payments are served from a table seeded with [`MockGateway::set_payment`].
/// Signatures are checked with the real HMAC scheme against `secret`.
/// Clones share state, so a test can keep one handle and give another to the facade.
#[derive(Clone)]
pub struct MockGateway {
    secret: String,
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            state: Arc::default(),
        }
    }

    /// Adds or replaces the payment served for `payment.id`.
    pub fn set_payment(&self, payment: Payment) {
        self.lock().payments.insert(payment.id.clone(), payment);
    }

    /// Makes every subsequent remote call fail with `error`.
    pub fn fail_with(&self, error: GatewayError) {
        self.lock().failure = Some(error);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn refund_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, GatewayCall::Refund { .. }))
            .count()
    }

    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        signature::sign(&self.secret, order_id, payment_id).unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: GatewayCall) -> Result<MutexGuard<'_, MockState>, GatewayError> {
        let mut state = self.lock();
        state.calls.push(call);
        match &state.failure {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<Order, GatewayError> {
        let mut state = self.record(GatewayCall::CreateOrder(request.clone()))?;
        state.orders_created += 1;
        Ok(Order {
            id: format!("order_mock_{}", state.orders_created),
            amount: request.amount,
            currency: request.currency,
            receipt: Some(request.receipt),
            status: Some("created".to_string()),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<Payment, GatewayError> {
        let state = self.record(GatewayCall::FetchPayment(payment_id.to_string()))?;
        state.payments.get(payment_id).cloned().ok_or_else(|| {
            GatewayError::BadRequest(format!("The id provided does not exist: {payment_id}"))
        })
    }

    async fn refund_payment(&self, payment_id: &str, amount: i64) -> Result<Refund, GatewayError> {
        let state = self.record(GatewayCall::Refund {
            payment_id: payment_id.to_string(),
            amount,
        })?;
        let currency = state.payments.get(payment_id).map(|p| p.currency.clone());
        Ok(Refund {
            id: format!("rfnd_mock_{payment_id}"),
            payment_id: payment_id.to_string(),
            amount,
            currency,
            status: Some("processed".to_string()),
        })
    }

    fn verify_payment_signature(&self, sig: &PaymentSignature) -> Result<(), GatewayError> {
        drop(self.record(GatewayCall::VerifySignature(sig.clone()))?);
        signature::verify(&self.secret, sig)
    }
}
