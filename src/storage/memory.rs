//! In-process document store.
//!
//! Key/value operations see every mutation immediately. Queries go through a
//! separate index that only catches up when a `RequestPlus` query runs or
//! [`InMemoryStore::refresh_index`] is called, so `NotBounded` queries can
//! observe stale results the same way they can against a real cluster.

use super::engine::{DocumentStore, StoredDocument};
use super::request::QueryRequest;
use crate::core::{StoreError, StoreResult};
use crate::mapping::Expiry;
use crate::query::{META_CAS, META_ID, ScanConsistency};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::trace;

#[derive(Debug, Clone)]
struct Entry {
    doc: StoredDocument,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

pub struct InMemoryStore {
    documents: RwLock<HashMap<String, Entry>>,
    index: RwLock<BTreeMap<String, Entry>>,
    synchronous_index: bool,
    next_cas: AtomicU64,
    available: AtomicBool,
    queries: AtomicU64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Store whose query index lags behind mutations.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            index: RwLock::new(BTreeMap::new()),
            synchronous_index: false,
            next_cas: AtomicU64::new(1),
            available: AtomicBool::new(true),
            queries: AtomicU64::new(0),
        }
    }

    /// Store whose query index is updated as part of every mutation.
    pub fn with_synchronous_index() -> Self {
        Self {
            synchronous_index: true,
            ..Self::new()
        }
    }

    /// Simulate the store going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of queries received so far.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    /// Bring the query index up to date with every mutation made so far.
    pub async fn refresh_index(&self) {
        let documents = self.documents.read().await;
        let mut index = self.index.write().await;
        *index = documents
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect();
    }

    /// Number of live documents.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        let documents = self.documents.read().await;
        documents.values().filter(|e| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }

    fn next_cas(&self) -> u64 {
        self.next_cas.fetch_add(1, Ordering::SeqCst)
    }

    fn entry(&self, id: &str, content: String, expiry: u32) -> Entry {
        let now = Utc::now();
        Entry {
            doc: StoredDocument {
                id: id.to_string(),
                content,
                expiry,
                cas: self.next_cas(),
            },
            expires_at: Expiry::deadline(expiry, now),
        }
    }

    async fn after_mutation(&self) {
        if self.synchronous_index {
            self.refresh_index().await;
        }
    }

    fn live<'a>(
        documents: &'a HashMap<String, Entry>,
        id: &str,
        now: DateTime<Utc>,
    ) -> Option<&'a Entry> {
        documents.get(id).filter(|e| !e.is_expired(now))
    }

    fn check_cas(entry: &Entry, id: &str, cas: Option<u64>) -> StoreResult<()> {
        match cas {
            Some(expected) if expected != entry.doc.cas => {
                Err(StoreError::CasMismatch(id.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<StoredDocument>> {
        self.check_available()?;
        let documents = self.documents.read().await;
        Ok(Self::live(&documents, id, Utc::now()).map(|e| e.doc.clone()))
    }

    async fn insert(&self, id: &str, content: String, expiry: u32) -> StoreResult<u64> {
        self.check_available()?;
        let cas = {
            let mut documents = self.documents.write().await;
            if Self::live(&documents, id, Utc::now()).is_some() {
                return Err(StoreError::DocumentExists(id.to_string()));
            }
            let entry = self.entry(id, content, expiry);
            let cas = entry.doc.cas;
            documents.insert(id.to_string(), entry);
            cas
        };
        trace!(id, cas, "insert");
        self.after_mutation().await;
        Ok(cas)
    }

    async fn upsert(&self, id: &str, content: String, expiry: u32) -> StoreResult<u64> {
        self.check_available()?;
        let cas = {
            let mut documents = self.documents.write().await;
            let entry = self.entry(id, content, expiry);
            let cas = entry.doc.cas;
            documents.insert(id.to_string(), entry);
            cas
        };
        trace!(id, cas, "upsert");
        self.after_mutation().await;
        Ok(cas)
    }

    async fn replace(
        &self,
        id: &str,
        content: String,
        expiry: u32,
        cas: Option<u64>,
    ) -> StoreResult<u64> {
        self.check_available()?;
        let new_cas = {
            let mut documents = self.documents.write().await;
            let existing = Self::live(&documents, id, Utc::now())
                .ok_or_else(|| StoreError::DocumentNotFound(id.to_string()))?;
            Self::check_cas(existing, id, cas)?;
            let entry = self.entry(id, content, expiry);
            let new_cas = entry.doc.cas;
            documents.insert(id.to_string(), entry);
            new_cas
        };
        trace!(id, cas = new_cas, "replace");
        self.after_mutation().await;
        Ok(new_cas)
    }

    async fn remove(&self, id: &str, cas: Option<u64>) -> StoreResult<()> {
        self.check_available()?;
        {
            let mut documents = self.documents.write().await;
            let existing = Self::live(&documents, id, Utc::now())
                .ok_or_else(|| StoreError::DocumentNotFound(id.to_string()))?;
            Self::check_cas(existing, id, cas)?;
            documents.remove(id);
        }
        trace!(id, "remove");
        self.after_mutation().await;
        Ok(())
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        self.check_available()?;
        let documents = self.documents.read().await;
        Ok(Self::live(&documents, id, Utc::now()).is_some())
    }

    async fn touch(&self, id: &str, expiry: u32) -> StoreResult<()> {
        self.check_available()?;
        let now = Utc::now();
        {
            let mut documents = self.documents.write().await;
            let entry = documents
                .get_mut(id)
                .filter(|e| !e.is_expired(now))
                .ok_or_else(|| StoreError::DocumentNotFound(id.to_string()))?;
            entry.doc.expiry = expiry;
            entry.expires_at = Expiry::deadline(expiry, now);
        }
        trace!(id, expiry, "touch");
        self.after_mutation().await;
        Ok(())
    }

    async fn query(&self, request: &QueryRequest) -> StoreResult<Vec<String>> {
        self.check_available()?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        let predicates = request.bound_predicates()?;

        if request.consistency == ScanConsistency::RequestPlus {
            self.refresh_index().await;
        }

        let now = Utc::now();
        let index = self.index.read().await;
        let mut rows = Vec::new();
        for entry in index.values().filter(|e| !e.is_expired(now)) {
            let mut body: JsonValue = serde_json::from_str(&entry.doc.content)
                .map_err(|e| StoreError::Other(format!("corrupt document '{}': {}", entry.doc.id, e)))?;
            let matches = predicates
                .iter()
                .all(|(field, value)| lookup(&body, field) == Some(value));
            if !matches {
                continue;
            }
            if let JsonValue::Object(map) = &mut body {
                map.insert(META_ID.to_string(), JsonValue::String(entry.doc.id.clone()));
                map.insert(META_CAS.to_string(), JsonValue::from(entry.doc.cas));
            }
            rows.push(body.to_string());
            if request.limit.is_some_and(|limit| rows.len() >= limit) {
                break;
            }
        }
        Ok(rows)
    }
}
