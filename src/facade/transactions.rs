use super::client::DocumentClient;
use crate::core::Result;
use crate::transaction::TransactionHandle;
use std::future::Future;

impl DocumentClient {
    /// Run `block` as a transaction against this client's store.
    ///
    /// ```ignore
    /// client.in_transaction(|_tx| async {
    ///     client.insert(&a).await?;
    ///     client.remove_by_id("b", None).await
    /// }).await?;
    /// ```
    pub async fn in_transaction<F, Fut, T>(&self, block: F) -> Result<T>
    where
        F: FnOnce(TransactionHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.transactions.run(block).await
    }

    pub fn begin_transaction(&self) -> TransactionHandle {
        self.transactions.begin()
    }

    pub async fn commit(&self, handle: &TransactionHandle) -> Result<()> {
        self.transactions.commit(handle).await
    }

    pub fn rollback(&self, handle: &TransactionHandle) {
        self.transactions.rollback(handle)
    }
}
