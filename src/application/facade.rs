use crate::domain::gateway::{GatewayError, Order, OrderRequest, PaymentSignature};
use crate::domain::money::{Amount, to_minor_units};
use crate::domain::ports::{PaymentGatewayBox, TransactionStoreBox};
use crate::domain::transaction::{Basket, STATUS_CAPTURED, Transaction};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Parameters the gateway appends to the checkout success redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub txnid: String,
}

/// Orchestrates one checkout transaction against the payment gateway.
///
/// `PaymentFacade` owns the transaction store and the gateway client; both
/// are injected so tests can substitute doubles. Every operation runs to
/// completion before returning and nothing is retried: the caller decides
/// whether a failure is shown to the customer or tried again.
pub struct PaymentFacade {
    store: TransactionStoreBox,
    gateway: PaymentGatewayBox,
    default_currency: String,
}

impl PaymentFacade {
    /// Creates a new `PaymentFacade`.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence for transaction records.
    /// * `gateway` - Client for the payment gateway API.
    /// * `default_currency` - Currency used when a basket carries none.
    pub fn new(
        store: TransactionStoreBox,
        gateway: PaymentGatewayBox,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            default_currency: default_currency.into(),
        }
    }

    fn currency_for(&self, basket: &Basket) -> String {
        basket
            .currency
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.default_currency.clone())
    }

    /// Records the start of a checkout. No gateway call is made.
    pub async fn start_transaction(
        &self,
        basket: &Basket,
        amount: Decimal,
        user_id: Option<String>,
        email: Option<String>,
    ) -> Result<Transaction> {
        let currency = self.currency_for(basket);
        let txn = Transaction::new(basket.id.clone(), amount, currency, user_id, email);
        self.store.insert(txn.clone()).await?;

        info!(
            txnid = %txn.txnid,
            basket_id = %basket.id,
            %amount,
            currency = %txn.currency,
            "started transaction"
        );
        Ok(txn)
    }

    /// Creates the remote order, using the txnid as the receipt.
    pub async fn create_remote_order(
        &self,
        amount: Decimal,
        basket: &Basket,
        txn: &Transaction,
    ) -> Result<Order> {
        let amount = Amount::new(amount)?;
        if txn.txnid.trim().is_empty() {
            return Err(PaymentError::Validation(
                "Transaction ID (txnid) is required and cannot be empty".to_string(),
            ));
        }

        let request = OrderRequest {
            amount: amount.minor_units()?,
            currency: self.currency_for(basket),
            receipt: txn.txnid.clone(),
        };

        let order = self
            .gateway
            .create_order(request)
            .await
            .map_err(|e| gateway_failure("creating order", &txn.txnid, e))?;

        info!(txnid = %txn.txnid, order_id = %order.id, "gateway order created");
        Ok(order)
    }

    /// Verifies the callback signature.
    ///
    /// Returns `Ok(true)` only when the gateway check passes. A failed check is
    /// an error, never `Ok(false)`.
    pub fn validate_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool> {
        if order_id.is_empty() || payment_id.is_empty() || signature.is_empty() {
            return Err(PaymentError::Validation(
                "Missing required parameters: order ID, payment ID, or signature".to_string(),
            ));
        }

        let parts = PaymentSignature {
            order_id: order_id.to_string(),
            payment_id: payment_id.to_string(),
            signature: signature.to_string(),
        };
        self.gateway
            .verify_payment_signature(&parts)
            .map_err(|e| gateway_failure("verifying signature", payment_id, e))?;

        info!(order_id, payment_id, "signature verified");
        Ok(true)
    }

    /// Pulls the authoritative payment from the gateway and mirrors it locally.
    ///
    /// The record is left untouched if amount or currency disagree, or if the
    /// payment is already bound to a different transaction.
    pub async fn reconcile_transaction(&self, payment_id: &str, txnid: &str) -> Result<Transaction> {
        let payment = self
            .gateway
            .fetch_payment(payment_id)
            .await
            .map_err(|e| gateway_failure("fetching payment", payment_id, e))?;

        let mut txn = self.store.get(txnid).await?.ok_or_else(|| {
            warn!(txnid, rz_id = payment_id, "no local transaction for txnid");
            PaymentError::NotFound(format!("Transaction {txnid} not found"))
        })?;

        // A payment settles at most one transaction.
        if let Some(owner) = self.store.get_by_rz_id(payment_id).await?
            && owner.txnid != txn.txnid
        {
            warn!(
                txnid,
                rz_id = payment_id,
                owner = %owner.txnid,
                "payment already reconciled against another transaction"
            );
            return Err(PaymentError::Duplicate(format!(
                "payment {payment_id} already belongs to transaction {}",
                owner.txnid
            )));
        }

        let expected_amount = to_minor_units(txn.amount)?;
        if expected_amount != payment.amount || txn.currency != payment.currency {
            warn!(
                txnid,
                rz_id = payment_id,
                expected_amount,
                actual_amount = payment.amount,
                expected_currency = %txn.currency,
                actual_currency = %payment.currency,
                "payment details mismatch"
            );
            return Err(PaymentError::ReconciliationMismatch {
                txnid: txn.txnid,
                expected_amount,
                actual_amount: payment.amount,
                expected_currency: txn.currency,
                actual_currency: payment.currency,
            });
        }

        txn.status = Some(payment.status);
        txn.rz_id = Some(payment_id.to_string());
        txn.payment_mode = payment.method;
        self.store.save(txn.clone()).await?;

        info!(txnid, rz_id = payment_id, status = ?txn.status, "transaction reconciled");
        Ok(txn)
    }

    /// Marks the transaction captured once the gateway reports it so.
    pub async fn capture_transaction(&self, payment_id: &str) -> Result<Transaction> {
        let mut txn = self.find_by_rz_id(payment_id).await?;

        let payment = self
            .gateway
            .fetch_payment(payment_id)
            .await
            .map_err(|e| gateway_failure("capturing payment", payment_id, e))?;

        if payment.status == STATUS_CAPTURED {
            txn.status = Some(STATUS_CAPTURED.to_string());
            self.store.save(txn.clone()).await?;
            info!(txnid = %txn.txnid, rz_id = payment_id, "payment captured");
        } else {
            info!(
                txnid = %txn.txnid,
                rz_id = payment_id,
                gateway_status = %payment.status,
                "payment not yet captured"
            );
        }
        Ok(txn)
    }

    /// Refunds `amount` minor units of a reconciled payment.
    ///
    /// Only this single request is checked against the original amount;
    /// earlier refunds are not tracked.
    pub async fn refund_transaction(&self, payment_id: &str, amount: i64, currency: &str) -> Result<()> {
        if amount <= 0 {
            return Err(PaymentError::Validation(
                "Refund amount must be positive".to_string(),
            ));
        }

        let txn = self.find_by_rz_id(payment_id).await?;

        let original = to_minor_units(txn.amount)?;
        if amount > original {
            warn!(txnid = %txn.txnid, rz_id = payment_id, amount, original, "refund exceeds original");
            return Err(PaymentError::Validation(format!(
                "Refund amount {amount} exceeds the original transaction amount {original}"
            )));
        }
        if currency != txn.currency {
            warn!(txnid = %txn.txnid, rz_id = payment_id, currency, "refund currency mismatch");
            return Err(PaymentError::Validation(format!(
                "Currency mismatch for the refund: expected {}, got {currency}",
                txn.currency
            )));
        }

        let refund = self
            .gateway
            .refund_payment(payment_id, amount)
            .await
            .map_err(|e| gateway_failure("refunding payment", payment_id, e))?;

        info!(
            txnid = %txn.txnid,
            rz_id = payment_id,
            refund_id = %refund.id,
            amount = %Decimal::new(amount, 2),
            currency,
            "payment refunded"
        );
        Ok(())
    }

    /// Completes a checkout from the gateway's success redirect.
    ///
    /// Runs signature validation, reconciliation and capture in that order and
    /// fails unless the payment ends up captured.
    pub async fn handle_callback(&self, params: &CallbackParams) -> Result<Transaction> {
        if params.txnid.is_empty() {
            return Err(PaymentError::Validation(
                "Unable to determine transaction details: txnid is missing".to_string(),
            ));
        }

        self.validate_signature(&params.order_id, &params.payment_id, &params.signature)?;
        self.reconcile_transaction(&params.payment_id, &params.txnid)
            .await?;
        let txn = self.capture_transaction(&params.payment_id).await?;

        if !txn.is_successful() {
            warn!(txnid = %txn.txnid, status = ?txn.status, "callback completed without capture");
            return Err(PaymentError::NotCaptured(format!(
                "transaction {} has status {}",
                txn.txnid,
                txn.status.as_deref().unwrap_or("unset")
            )));
        }
        Ok(txn)
    }

    /// All stored transactions, ordered by txnid.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let mut transactions = self.store.get_all().await?;
        transactions.sort_by(|a, b| a.txnid.cmp(&b.txnid));
        Ok(transactions)
    }

    pub async fn get_transaction(&self, txnid: &str) -> Result<Transaction> {
        self.store
            .get(txnid)
            .await?
            .ok_or_else(|| PaymentError::NotFound(format!("Transaction {txnid} not found")))
    }

    async fn find_by_rz_id(&self, payment_id: &str) -> Result<Transaction> {
        self.store.get_by_rz_id(payment_id).await?.ok_or_else(|| {
            error!(rz_id = payment_id, "transaction with gateway id not found");
            PaymentError::NotFound(format!("Transaction with payment id {payment_id} not found"))
        })
    }
}

fn gateway_failure(action: &str, reference: &str, err: GatewayError) -> PaymentError {
    error!(reference, error = %err, "gateway call failed while {action}");
    PaymentError::Gateway(format!("{action} for {reference}: {err}"))
}
