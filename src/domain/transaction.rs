use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gateway status reported once the funds have been settled to the merchant.
pub const STATUS_CAPTURED: &str = "captured";

/// Length of the locally generated correlation token.
pub const TXNID_LEN: usize = 28;

/// The part of a checkout basket the facade reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basket {
    pub id: String,
    pub currency: Option<String>,
}

impl Basket {
    pub fn new(id: impl Into<String>, currency: Option<String>) -> Self {
        Self {
            id: id.into(),
            currency,
        }
    }
}

/// One checkout attempt against the gateway.
///
/// `txnid` is the correlation key sent to the gateway as the order receipt.
/// `status`, `rz_id` and `payment_mode` mirror the gateway and are only
/// written during reconciliation and capture.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub txnid: String,
    pub amount: Decimal,
    pub currency: String,
    pub basket_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rz_id: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<String>,
}

impl Transaction {
    pub fn new(
        basket_id: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        user_id: Option<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            txnid: generate_txnid(),
            amount,
            currency: currency.into(),
            basket_id: basket_id.into(),
            user_id,
            email,
            status: None,
            rz_id: None,
            payment_mode: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status.as_deref() == Some(STATUS_CAPTURED)
    }
}

fn generate_txnid() -> String {
    let mut txnid = Uuid::new_v4().simple().to_string();
    txnid.truncate(TXNID_LEN);
    txnid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_transaction_has_unset_gateway_fields() {
        let txn = Transaction::new("1", dec!(99.99), "INR", None, None);

        assert_eq!(txn.txnid.len(), TXNID_LEN);
        assert!(txn.txnid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(txn.status, None);
        assert_eq!(txn.rz_id, None);
        assert!(!txn.is_successful());
    }

    #[test]
    fn test_txnids_are_unique() {
        let a = Transaction::new("1", dec!(1), "INR", None, None);
        let b = Transaction::new("1", dec!(1), "INR", None, None);
        assert_ne!(a.txnid, b.txnid);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_is_successful_only_when_captured() {
        let mut txn = Transaction::new("1", dec!(1), "INR", None, None);
        txn.status = Some("authorized".to_string());
        assert!(!txn.is_successful());
        txn.status = Some(STATUS_CAPTURED.to_string());
        assert!(txn.is_successful());
    }

    #[test]
    fn test_transaction_json_defaults_optional_fields() {
        let json = format!(
            r#"{{"id":"{}","txnid":"abc","amount":"10.00","currency":"INR","basket_id":"7"}}"#,
            Uuid::nil()
        );
        let txn: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(txn.amount, dec!(10.00));
        assert_eq!(txn.user_id, None);
        assert_eq!(txn.payment_mode, None);
    }
}
