use super::error::{MappingError, MappingResult};
use super::expiry::{Expiry, ExpiryUnit};
use super::properties::PropertySource;
use chrono::{DateTime, Utc};

/// Capabilities every mapped document type exposes to the client.
pub trait DocumentMetadata {
    /// Expiry to apply when the document is written.
    fn expiry(&self) -> MappingResult<Expiry>;

    /// Whether reading the document should reset its expiry.
    fn is_touch_on_read(&self) -> MappingResult<bool>;

    /// Property that receives the full-text-search score, if any.
    fn score_property(&self) -> Option<&str>;
}

/// Explicit, per-type mapping configuration.
///
/// ```ignore
/// let meta = EntityMetadata::new("Session")
///     .expire_after(2)
///     .expiry_unit(ExpiryUnit::Hours)
///     .touch_on_read(true);
/// ```
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    type_name: String,
    type_alias: String,
    id_property: String,
    expiry: u64,
    expiry_unit: ExpiryUnit,
    expiry_expression: Option<String>,
    touch_on_read: bool,
    score_property: Option<String>,
    properties: PropertySource,
}

impl EntityMetadata {
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            type_alias: type_name.clone(),
            type_name,
            id_property: "id".to_string(),
            expiry: 0,
            expiry_unit: ExpiryUnit::Seconds,
            expiry_expression: None,
            touch_on_read: false,
            score_property: None,
            properties: PropertySource::new(),
        }
    }

    /// Value written under the type key to tell entity types apart in a bucket.
    pub fn type_alias(mut self, alias: impl Into<String>) -> Self {
        self.type_alias = alias.into();
        self
    }

    /// Name of the entity field holding the document key.
    pub fn id_property(mut self, name: impl Into<String>) -> Self {
        self.id_property = name.into();
        self
    }

    pub fn expire_after(mut self, amount: u64) -> Self {
        self.expiry = amount;
        self
    }

    pub fn expiry_unit(mut self, unit: ExpiryUnit) -> Self {
        self.expiry_unit = unit;
        self
    }

    /// Integer literal or `${property}` placeholder, evaluated on every lookup.
    pub fn expiry_expression(mut self, expression: impl Into<String>) -> Self {
        self.expiry_expression = Some(expression.into());
        self
    }

    pub fn touch_on_read(mut self, touch: bool) -> Self {
        self.touch_on_read = touch;
        self
    }

    pub fn score_field(mut self, name: impl Into<String>) -> Self {
        self.score_property = Some(name.into());
        self
    }

    pub fn property_source(mut self, properties: PropertySource) -> Self {
        self.properties = properties;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn alias(&self) -> &str {
        &self.type_alias
    }

    pub fn id_field(&self) -> &str {
        &self.id_property
    }

    /// Expiry as seen at `now`.
    pub fn expiry_at(&self, now: DateTime<Utc>) -> MappingResult<Expiry> {
        let amount = match &self.expiry_expression {
            Some(_) if self.expiry != 0 => {
                return Err(MappingError::ConflictingExpiry(self.type_name.clone()));
            }
            Some(expression) => self.evaluate(expression)?,
            None => self.expiry,
        };
        Ok(Expiry::from_shift(amount, self.expiry_unit, now))
    }

    fn evaluate(&self, expression: &str) -> MappingResult<u64> {
        let expression = expression.trim();
        let resolved = match expression
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(key) => self
                .properties
                .get(key)
                .ok_or_else(|| MappingError::UnresolvedPlaceholder(key.to_string()))?,
            None => expression.to_string(),
        };

        resolved
            .trim()
            .parse::<u64>()
            .map_err(|_| MappingError::InvalidExpiryExpression(resolved))
    }
}

impl DocumentMetadata for EntityMetadata {
    fn expiry(&self) -> MappingResult<Expiry> {
        self.expiry_at(Utc::now())
    }

    fn is_touch_on_read(&self) -> MappingResult<bool> {
        Ok(self.touch_on_read && !self.expiry()?.is_none())
    }

    fn score_property(&self) -> Option<&str> {
        self.score_property.as_deref()
    }
}
