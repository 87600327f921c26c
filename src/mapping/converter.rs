use super::error::{MappingError, MappingResult};
use super::metadata::{DocumentMetadata, EntityMetadata};
use crate::document::Document;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Attribute used to record which entity type a document was written from.
pub const DEFAULT_TYPE_KEY: &str = "_class";

/// A type that can be stored as a document.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Document key of this instance.
    fn id(&self) -> String;

    fn metadata() -> EntityMetadata {
        EntityMetadata::new(std::any::type_name::<Self>())
    }
}

/// Converts entities into [`Document`]s and back.
///
/// The id field is lifted out of the content into the document key, `null`
/// attributes are dropped, and the entity's type alias is written under the
/// configured type key.
#[derive(Debug, Clone)]
pub struct MappingConverter {
    type_key: String,
}

impl Default for MappingConverter {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_KEY)
    }
}

impl MappingConverter {
    pub fn new(type_key: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
        }
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn write<E: Entity>(&self, entity: &E) -> MappingResult<Document> {
        let meta = E::metadata();
        let value = serde_json::to_value(entity).map_err(|e| MappingError::Conversion {
            type_name: meta.type_name().to_string(),
            reason: e.to_string(),
        })?;
        let JsonValue::Object(mut content) = value else {
            return Err(MappingError::NotAnObject(meta.type_name().to_string()));
        };

        content.remove(meta.id_field());
        content.retain(|_, v| !v.is_null());
        content.insert(self.type_key.clone(), JsonValue::String(meta.alias().to_string()));

        let mut doc = Document::with_expiration(entity.id(), meta.expiry()?.as_raw());
        doc.set_content(content);
        Ok(doc)
    }

    pub fn read<E: Entity>(&self, doc: &Document) -> MappingResult<E> {
        self.read_scored(doc, None)
    }

    /// Read an entity, filling the metadata's score property from `score`.
    pub fn read_scored<E: Entity>(&self, doc: &Document, score: Option<f64>) -> MappingResult<E> {
        let meta = E::metadata();
        let mut content = doc.clone().into_content();
        content.remove(&self.type_key);
        if let Some(id) = doc.id() {
            content.insert(meta.id_field().to_string(), JsonValue::String(id.to_string()));
        }
        if let (Some(property), Some(score)) = (meta.score_property(), score) {
            content.insert(property.to_string(), JsonValue::from(score));
        }

        serde_json::from_value(JsonValue::Object(content)).map_err(|e| MappingError::Conversion {
            type_name: meta.type_name().to_string(),
            reason: e.to_string(),
        })
    }
}
