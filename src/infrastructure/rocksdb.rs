use crate::domain::ports::TransactionStore;
use crate::domain::transaction::Transaction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing transactions, keyed by txnid.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family mapping gateway payment ids to txnids.
pub const CF_RZ_INDEX: &str = "rz_index";

/// A persistent store implementation using RocksDB.
///
/// Transactions are stored as JSON under their txnid. The payment-id index is
/// written in the same batch as the record so both stay consistent.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_transactions = ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default());
        let cf_rz_index = ColumnFamilyDescriptor::new(CF_RZ_INDEX, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_transactions, cf_rz_index])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::Internal(format!("{name} column family not found")))
    }

    fn read(&self, txnid: &str) -> Result<Option<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        match self.db.get_cf(cf, txnid.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, tx: &Transaction, previous: Option<&Transaction>) -> Result<()> {
        let cf_tx = self.cf(CF_TRANSACTIONS)?;
        let cf_index = self.cf(CF_RZ_INDEX)?;

        if let Some(rz_id) = &tx.rz_id
            && let Some(owner) = self.db.get_cf(cf_index, rz_id.as_bytes())?
            && owner != tx.txnid.as_bytes()
        {
            return Err(PaymentError::Duplicate(format!(
                "payment {rz_id} already belongs to transaction {}",
                String::from_utf8_lossy(&owner)
            )));
        }

        let mut batch = WriteBatch::default();
        if let Some(old_rz_id) = previous.and_then(|p| p.rz_id.as_ref())
            && tx.rz_id.as_ref() != Some(old_rz_id)
        {
            batch.delete_cf(cf_index, old_rz_id.as_bytes());
        }
        if let Some(rz_id) = &tx.rz_id {
            batch.put_cf(cf_index, rz_id.as_bytes(), tx.txnid.as_bytes());
        }
        batch.put_cf(cf_tx, tx.txnid.as_bytes(), serde_json::to_vec(tx)?);

        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn insert(&self, tx: Transaction) -> Result<()> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        // Only checks presence, the value is not needed.
        if self.db.get_pinned_cf(cf, tx.txnid.as_bytes())?.is_some() {
            return Err(PaymentError::Duplicate(tx.txnid));
        }
        self.write(&tx, None)
    }

    async fn save(&self, tx: Transaction) -> Result<()> {
        let previous = self.read(&tx.txnid)?;
        self.write(&tx, previous.as_ref())
    }

    async fn get(&self, txnid: &str) -> Result<Option<Transaction>> {
        self.read(txnid)
    }

    async fn get_by_rz_id(&self, rz_id: &str) -> Result<Option<Transaction>> {
        let cf = self.cf(CF_RZ_INDEX)?;
        let Some(txnid) = self.db.get_cf(cf, rz_id.as_bytes())? else {
            return Ok(None);
        };
        let txnid = String::from_utf8(txnid)
            .map_err(|e| PaymentError::Internal(format!("Corrupt payment index entry: {e}")))?;
        self.read(&txnid)
    }

    async fn get_all(&self) -> Result<Vec<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;

        let mut transactions = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            transactions.push(serde_json::from_slice(&value)?);
        }

        Ok(transactions)
    }
}
