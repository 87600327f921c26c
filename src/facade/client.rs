use crate::connection::ClientConfig;
use crate::core::{OdmError, Result};
use crate::document::Document;
use crate::json::{JsonTranslationService, TranslationService};
use crate::mapping::{DocumentMetadata, Entity, MappingConverter};
use crate::query::{Query, QueryExecutor, QueryResult, ScanConsistency};
use crate::storage::{DocumentStore, InMemoryStore, StoredDocument};
use crate::transaction::{self, StagedMutation, StagedRead, TransactionManager};
use std::sync::Arc;
use tracing::debug;

/// Entry point for reading and writing entities.
///
/// Writes made inside [`DocumentClient::in_transaction`] are staged in the
/// ambient transaction and reach the store on commit; reads inside the same
/// transaction see them.
///
/// # Examples
///
/// ```ignore
/// let client = DocumentClient::in_memory(ClientConfig::new("travel"))?;
/// client.insert(&airport).await?;
/// let found: Option<Airport> = client.find_by_id("airport::cdg").await?;
/// ```
pub struct DocumentClient {
    config: ClientConfig,
    store: Arc<dyn DocumentStore>,
    codec: JsonTranslationService,
    converter: MappingConverter,
    executor: QueryExecutor,
    pub(super) transactions: TransactionManager,
}

impl DocumentClient {
    pub fn new(store: Arc<dyn DocumentStore>, config: ClientConfig) -> Result<Self> {
        config.validate().map_err(OdmError::Config)?;

        let executor = QueryExecutor::new(store.clone(), &config.bucket, config.default_consistency)
            .with_timeout(config.query_timeout);
        Ok(Self {
            converter: MappingConverter::new(&config.type_key),
            codec: JsonTranslationService::new(),
            transactions: TransactionManager::new(store.clone()),
            executor,
            store,
            config,
        })
    }

    /// Client backed by a fresh [`InMemoryStore`].
    pub fn in_memory(config: ClientConfig) -> Result<Self> {
        Self::new(Arc::new(InMemoryStore::new()), config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    pub fn codec(&self) -> &JsonTranslationService {
        &self.codec
    }

    pub fn converter(&self) -> &MappingConverter {
        &self.converter
    }

    pub fn set_default_consistency(&self, consistency: ScanConsistency) {
        self.executor.set_default_consistency(consistency);
    }

    pub async fn find_by_id<E: Entity>(&self, id: &str) -> Result<Option<E>> {
        if let Some(tx) = transaction::current() {
            match tx.staged_read(id) {
                Some(StagedRead::Written(content)) => {
                    return self.read_content(id, &content, 0).map(Some);
                }
                Some(StagedRead::Removed) => return Ok(None),
                None => {}
            }
        }

        let Some(stored) = self.store.get(id).await? else {
            return Ok(None);
        };

        let meta = E::metadata();
        if meta.is_touch_on_read()? && !transaction::is_in_transaction() {
            self.store.touch(id, meta.expiry()?.as_raw()).await?;
        }
        self.read_stored(&stored).map(Some)
    }

    pub async fn insert<E: Entity>(&self, entity: &E) -> Result<()> {
        let (id, content, expiry) = self.encode_entity(entity)?;
        match transaction::current() {
            Some(tx) => tx.stage(StagedMutation::Insert { id, content, expiry })?,
            None => {
                self.store.insert(&id, content, expiry).await?;
            }
        }
        Ok(())
    }

    /// Overwrite an existing entity. `cas`, when given, must match the stored document.
    pub async fn replace<E: Entity>(&self, entity: &E, cas: Option<u64>) -> Result<()> {
        let (id, content, expiry) = self.encode_entity(entity)?;
        match transaction::current() {
            Some(tx) => tx.stage(StagedMutation::Replace {
                id,
                content,
                expiry,
                cas,
            })?,
            None => {
                self.store.replace(&id, content, expiry, cas).await?;
            }
        }
        Ok(())
    }

    pub async fn upsert<E: Entity>(&self, entity: &E) -> Result<()> {
        transaction::verify_not_in_transaction("upsert")?;
        let (id, content, expiry) = self.encode_entity(entity)?;
        self.store.upsert(&id, content, expiry).await?;
        Ok(())
    }

    pub async fn remove_by_id(&self, id: &str, cas: Option<u64>) -> Result<()> {
        match transaction::current() {
            Some(tx) => tx.stage(StagedMutation::Remove {
                id: id.to_string(),
                cas,
            })?,
            None => self.store.remove(id, cas).await?,
        }
        Ok(())
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        transaction::verify_not_in_transaction("exists")?;
        Ok(self.store.exists(id).await?)
    }

    /// Run a raw query, without restricting it to an entity type.
    pub async fn query(&self, query: &Query) -> Result<QueryResult> {
        self.executor.execute(query).await
    }

    /// Entities of type `E` matching `query`.
    pub async fn find_by_query<E: Entity>(&self, query: Query) -> Result<Vec<E>> {
        let result = self.executor.execute(&self.typed::<E>(query)).await?;
        debug!(rows = result.row_count(), consistency = %result.consistency(), "find_by_query");
        result
            .documents()?
            .iter()
            .map(|(doc, score)| self.converter.read_scored(doc, *score).map_err(OdmError::from))
            .collect()
    }

    pub async fn count<E: Entity>(&self, query: Query) -> Result<usize> {
        Ok(self.executor.execute(&self.typed::<E>(query)).await?.row_count())
    }

    fn typed<E: Entity>(&self, query: Query) -> Query {
        query.where_eq(self.converter.type_key(), E::metadata().alias())
    }

    fn encode_entity<E: Entity>(&self, entity: &E) -> Result<(String, String, u32)> {
        let doc = self.converter.write(entity)?;
        let content = self.codec.encode(&doc)?;
        let id = doc.id().map(str::to_string).unwrap_or_else(|| entity.id());
        Ok((id, content, doc.expiration()))
    }

    fn read_stored<E: Entity>(&self, stored: &StoredDocument) -> Result<E> {
        self.read_content(&stored.id, &stored.content, stored.expiry)
    }

    fn read_content<E: Entity>(&self, id: &str, content: &str, expiry: u32) -> Result<E> {
        let mut doc = Document::with_expiration(id, expiry);
        self.codec.decode(content, &mut doc)?;
        Ok(self.converter.read(&doc)?)
    }
}
