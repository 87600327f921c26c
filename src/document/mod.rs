//! In-memory representation of a stored JSON document.
//!
//! A [`Document`] is what entities are converted into before encoding and what
//! raw store payloads are decoded into before being read back as entities.
//! Content keys are kept sorted so that encoding is canonical.

use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Expiration of a document that never expires.
pub const DEFAULT_EXPIRATION_TIME: u32 = 0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    id: Option<String>,
    expiration: u32,
    content: BTreeMap<String, JsonValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self::with_expiration(id, DEFAULT_EXPIRATION_TIME)
    }

    pub fn with_expiration(id: impl Into<String>, expiration: u32) -> Self {
        Self {
            id: Some(id.into()),
            expiration,
            content: BTreeMap::new(),
        }
    }

    /// Store a value under `key`, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.content.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.content.get(key)
    }

    /// Convenience accessor for string attributes.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(JsonValue::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.content.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.content.contains_key(key)
    }

    pub fn contains_value(&self, value: &JsonValue) -> bool {
        self.content.values().any(|v| v == value)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of top-level attributes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Number of attributes including every member of nested objects and arrays.
    pub fn size_recursive(&self) -> usize {
        self.content.len() + self.content.values().map(nested_size).sum::<usize>()
    }

    pub fn content(&self) -> &BTreeMap<String, JsonValue> {
        &self.content
    }

    pub fn set_content(&mut self, content: Map<String, JsonValue>) -> &mut Self {
        self.content = content.into_iter().collect();
        self
    }

    /// Export the content as a JSON object value.
    pub fn export(&self) -> JsonValue {
        JsonValue::Object(
            self.content
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn into_content(self) -> Map<String, JsonValue> {
        self.content.into_iter().collect()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    pub fn expiration(&self) -> u32 {
        self.expiration
    }

    pub fn set_expiration(&mut self, expiration: u32) -> &mut Self {
        self.expiration = expiration;
        self
    }
}

fn nested_size(value: &JsonValue) -> usize {
    match value {
        JsonValue::Object(map) => map.len() + map.values().map(nested_size).sum::<usize>(),
        JsonValue::Array(items) => items.len() + items.iter().map(nested_size).sum::<usize>(),
        _ => 0,
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Document{{id={}, exp={}, content={}}}",
            self.id.as_deref().unwrap_or("null"),
            self.expiration,
            self.export()
        )
    }
}
