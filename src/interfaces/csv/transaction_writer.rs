use crate::domain::transaction::Transaction;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct TransactionRow<'a> {
    txnid: &'a str,
    basket_id: &'a str,
    amount: Decimal,
    currency: &'a str,
    status: Option<&'a str>,
    rz_id: Option<&'a str>,
    payment_mode: Option<&'a str>,
    email: Option<&'a str>,
    user_id: Option<&'a str>,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            txnid: &tx.txnid,
            basket_id: &tx.basket_id,
            amount: tx.amount,
            currency: &tx.currency,
            status: tx.status.as_deref(),
            rz_id: tx.rz_id.as_deref(),
            payment_mode: tx.payment_mode.as_deref(),
            email: tx.email.as_deref(),
            user_id: tx.user_id.as_deref(),
        }
    }
}

/// Writes transactions as CSV, one row per record, header first.
///
/// Unset optional fields are written as empty cells.
pub struct TransactionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TransactionWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new().has_headers(true).from_writer(sink);
        Self { writer }
    }

    pub fn write_transactions<'a, I>(&mut self, transactions: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut wrote_any = false;
        for tx in transactions {
            self.writer.serialize(TransactionRow::from(tx))?;
            wrote_any = true;
        }
        // serde only emits the header alongside the first record
        if !wrote_any {
            self.writer.write_record([
                "txnid",
                "basket_id",
                "amount",
                "currency",
                "status",
                "rz_id",
                "payment_mode",
                "email",
                "user_id",
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn render(transactions: &[Transaction]) -> String {
        let mut buf = Vec::new();
        TransactionWriter::new(&mut buf)
            .write_transactions(transactions)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_writes_header_and_rows() {
        let mut tx = Transaction::new("7", dec!(99.99), "INR", None, Some("a@b.in".into()));
        tx.status = Some("captured".into());
        tx.rz_id = Some("pay_1".into());

        let out = render(std::slice::from_ref(&tx));
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "txnid,basket_id,amount,currency,status,rz_id,payment_mode,email,user_id"
        );
        assert_eq!(
            lines.next().unwrap(),
            format!("{},7,99.99,INR,captured,pay_1,,a@b.in,", tx.txnid)
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_listing_still_has_header() {
        let out = render(&[]);
        assert_eq!(
            out.trim_end(),
            "txnid,basket_id,amount,currency,status,rz_id,payment_mode,email,user_id"
        );
    }
}
