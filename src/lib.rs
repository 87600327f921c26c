// ============================================================================
// couchodm Library
// ============================================================================

//! Object-document mapping for Couchbase-style stores.
//!
//! Typed entities are mapped to JSON [`Document`]s, queried at an explicit or
//! configured [`ScanConsistency`], and written through transactions whose
//! context follows the logical task across `.await` points and worker threads.
//!
//! ```ignore
//! use couchodm::prelude::*;
//!
//! let client = DocumentClient::in_memory(ClientConfig::new("travel"))?;
//! client.in_transaction(|_| async {
//!     client.insert(&airport).await?;
//!     Ok(())
//! }).await?;
//!
//! let found: Vec<Airport> = client
//!     .find_by_query(Query::new().where_eq("country", "France").consistency(ScanConsistency::RequestPlus))
//!     .await?;
//! ```

pub mod connection;
pub mod core;
pub mod document;
pub mod facade;
pub mod json;
pub mod mapping;
pub mod prelude;
pub mod query;
pub mod storage;
pub mod transaction;

// Re-export main types for convenience
pub use connection::ClientConfig;
pub use crate::core::{OdmError, Result, StoreError, TransactionError};
pub use document::Document;
pub use facade::DocumentClient;
pub use json::{JsonError, JsonTranslationService, TranslationService};
pub use mapping::{
    DocumentMetadata, Entity, EntityMetadata, Expiry, ExpiryUnit, MappingConverter, MappingError,
    PropertySource, TTL_IN_SECONDS_INCLUSIVE_END,
};
pub use query::{Query, QueryExecutor, QueryResult, ScanConsistency};
pub use storage::{DocumentStore, InMemoryStore, StoredDocument};
pub use transaction::{TransactionHandle, TransactionManager, TransactionState};
