use super::consistency::ScanConsistency;
use super::query::Query;
use super::result::QueryResult;
use crate::core::{Result, StoreError};
use crate::storage::DocumentStore;
use crate::transaction;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, trace};

/// Runs [`Query`]s against a store at a resolved scan consistency.
///
/// A query without an explicit consistency runs at the executor's default,
/// which can be changed at runtime without touching call sites. Store
/// failures are returned as-is; retrying is up to the caller.
pub struct QueryExecutor {
    store: Arc<dyn DocumentStore>,
    bucket: String,
    default_consistency: RwLock<ScanConsistency>,
    default_timeout: Option<Duration>,
}

impl QueryExecutor {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        bucket: impl Into<String>,
        default_consistency: ScanConsistency,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            default_consistency: RwLock::new(default_consistency),
            default_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn default_consistency(&self) -> ScanConsistency {
        *self
            .default_consistency
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the consistency used by subsequent queries that don't set one.
    pub fn set_default_consistency(&self, consistency: ScanConsistency) {
        *self
            .default_consistency
            .write()
            .unwrap_or_else(PoisonError::into_inner) = consistency;
    }

    pub fn resolve_consistency(&self, query: &Query) -> ScanConsistency {
        query
            .scan_consistency()
            .unwrap_or_else(|| self.default_consistency())
    }

    pub async fn execute(&self, query: &Query) -> Result<QueryResult> {
        if query.uses_flex_index() {
            transaction::verify_not_in_transaction("flex index query")?;
        }

        let consistency = self.resolve_consistency(query);
        let timeout = query.query_timeout().or(self.default_timeout);
        let request = query.to_request(&self.bucket, consistency, timeout);
        debug!(statement = %request.statement, %consistency, "executing query");

        let rows = match timeout {
            Some(limit) => tokio::time::timeout(limit, self.store.query(&request))
                .await
                .map_err(|_| StoreError::Timeout(format!("query exceeded {:?}", limit)))??,
            None => self.store.query(&request).await?,
        };

        trace!(rows = rows.len(), "query returned");
        Ok(QueryResult::new(request.statement, consistency, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    #[tokio::test]
    async fn test_default_consistency_applies_to_unqualified_queries() {
        let store = Arc::new(InMemoryStore::new());
        let executor = QueryExecutor::new(store, "default", ScanConsistency::NotBounded);

        let result = executor.execute(&Query::new()).await.unwrap();
        assert_eq!(result.consistency(), ScanConsistency::NotBounded);

        executor.set_default_consistency(ScanConsistency::RequestPlus);
        let result = executor.execute(&Query::new()).await.unwrap();
        assert_eq!(result.consistency(), ScanConsistency::RequestPlus);
    }

    #[tokio::test]
    async fn test_explicit_consistency_wins() {
        let store = Arc::new(InMemoryStore::new());
        let executor = QueryExecutor::new(store, "default", ScanConsistency::RequestPlus);

        let query = Query::new().consistency(ScanConsistency::NotBounded);
        assert_eq!(executor.resolve_consistency(&query), ScanConsistency::NotBounded);
        let result = executor.execute(&query).await.unwrap();
        assert_eq!(result.consistency(), ScanConsistency::NotBounded);
    }
}
