use crate::domain::ports::TransactionStore;
use crate::domain::transaction::Transaction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    transactions: HashMap<String, Transaction>,
    // rz_id -> txnid
    rz_index: HashMap<String, String>,
}

/// A thread-safe in-memory store for checkout transactions.
///
/// Keeps a secondary index from gateway payment id to txnid so capture and
/// refund lookups do not scan. Cloning shares the underlying tables.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryTransactionStore {
    /// Creates a new, empty in-memory transaction store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn put(&mut self, tx: Transaction) -> Result<()> {
        if let Some(rz_id) = &tx.rz_id
            && let Some(owner) = self.rz_index.get(rz_id)
            && *owner != tx.txnid
        {
            return Err(PaymentError::Duplicate(format!(
                "payment {rz_id} already belongs to transaction {owner}"
            )));
        }
        if let Some(previous) = self.transactions.get(&tx.txnid)
            && let Some(old_rz_id) = &previous.rz_id
            && tx.rz_id.as_ref() != Some(old_rz_id)
        {
            self.rz_index.remove(old_rz_id);
        }
        if let Some(rz_id) = &tx.rz_id {
            self.rz_index.insert(rz_id.clone(), tx.txnid.clone());
        }
        self.transactions.insert(tx.txnid.clone(), tx);
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, tx: Transaction) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.transactions.contains_key(&tx.txnid) {
            return Err(PaymentError::Duplicate(tx.txnid));
        }
        tables.put(tx)
    }

    async fn save(&self, tx: Transaction) -> Result<()> {
        self.tables.write().await.put(tx)
    }

    async fn get(&self, txnid: &str) -> Result<Option<Transaction>> {
        let tables = self.tables.read().await;
        Ok(tables.transactions.get(txnid).cloned())
    }

    async fn get_by_rz_id(&self, rz_id: &str) -> Result<Option<Transaction>> {
        let tables = self.tables.read().await;
        Ok(tables
            .rz_index
            .get(rz_id)
            .and_then(|txnid| tables.transactions.get(txnid))
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<Transaction>> {
        let tables = self.tables.read().await;
        Ok(tables.transactions.values().cloned().collect())
    }
}
