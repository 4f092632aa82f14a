use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A strictly positive amount in the currency's major unit (e.g. rupees).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::Validation(
                "Amount must be a positive decimal number".to_string(),
            ))
        }
    }

    /// Parses caller-supplied text, rejecting anything that is not a positive decimal.
    pub fn parse(raw: &str) -> Result<Self> {
        let value = Decimal::from_str(raw.trim()).map_err(|_| {
            PaymentError::Validation(format!(
                "Invalid amount {raw:?}: must be a valid decimal number"
            ))
        })?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn minor_units(&self) -> Result<i64> {
        to_minor_units(self.0)
    }
}

/// Converts a major-unit amount to the gateway's minor units (×100).
///
/// Fractions of a minor unit are truncated toward zero, so `10.005` becomes `1000`.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|scaled| scaled.trunc())
        .and_then(|scaled| scaled.to_i64())
        .ok_or_else(|| PaymentError::amount_overflow(amount))
}
