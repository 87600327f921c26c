use super::request::QueryRequest;
use crate::core::StoreResult;
use async_trait::async_trait;

/// A document fetched from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    /// JSON text of the document body.
    pub content: String,
    /// Raw expiry the document was written with.
    pub expiry: u32,
    pub cas: u64,
}

/// Key/value + query store the client talks to - allows pluggable backends.
///
/// Implementations only move JSON text around; encoding, mapping and
/// transaction staging happen above this trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Create a document, failing if the key is already taken. Returns the new CAS.
    async fn insert(&self, id: &str, content: String, expiry: u32) -> StoreResult<u64>;

    /// Create or overwrite a document. Returns the new CAS.
    async fn upsert(&self, id: &str, content: String, expiry: u32) -> StoreResult<u64>;

    /// Overwrite an existing document, optionally guarded by `cas`. Returns the new CAS.
    async fn replace(
        &self,
        id: &str,
        content: String,
        expiry: u32,
        cas: Option<u64>,
    ) -> StoreResult<u64>;

    async fn remove(&self, id: &str, cas: Option<u64>) -> StoreResult<()>;

    async fn exists(&self, id: &str) -> StoreResult<bool>;

    /// Reset the expiry of an existing document.
    async fn touch(&self, id: &str, expiry: u32) -> StoreResult<()>;

    /// Run a query, returning one JSON object per row.
    async fn query(&self, request: &QueryRequest) -> StoreResult<Vec<String>>;
}
