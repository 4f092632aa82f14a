use rust_decimal_macros::dec;
use rzpay::domain::ports::{PaymentGatewayBox, TransactionStoreBox};
use rzpay::domain::transaction::Transaction;
use rzpay::infrastructure::in_memory::InMemoryTransactionStore;
use rzpay::infrastructure::mock::MockGateway;

#[tokio::test]
async fn test_ports_as_trait_objects() {
    let store: TransactionStoreBox = Box::new(InMemoryTransactionStore::new());
    let gateway: PaymentGatewayBox = Box::new(MockGateway::new("secret"));

    let tx = Transaction::new("1", dec!(100.0), "INR", None, None);
    let txnid = tx.txnid.clone();

    // Verify Send + Sync by spawning tasks
    let store_handle = tokio::spawn(async move {
        store.insert(tx).await.unwrap();
        store.get(&txnid).await.unwrap().unwrap()
    });
    let gateway_handle = tokio::spawn(async move { gateway.fetch_payment("pay_1").await });

    let retrieved = store_handle.await.unwrap();
    assert_eq!(retrieved.basket_id, "1");

    assert!(gateway_handle.await.unwrap().is_err());
}
