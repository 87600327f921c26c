use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared, mutable key/value properties used to resolve `${name}` placeholders.
///
/// Clones share the same underlying map, so an update made through one handle
/// is visible to every metadata instance holding another.
#[derive(Debug, Clone, Default)]
pub struct PropertySource {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl PropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}
