use crate::core::{StoreError, StoreResult};
use crate::query::{QueryParameters, ScanConsistency};
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    /// Compared as-is, whatever its contents.
    Literal(JsonValue),
    /// Bound from the query parameters: a 1-based position or a name.
    Parameter(String),
}

/// Field equality test.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub value: PredicateValue,
}

/// Everything a store needs to run one query invocation.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub statement: String,
    pub predicates: Vec<Predicate>,
    pub parameters: QueryParameters,
    pub limit: Option<usize>,
    pub consistency: ScanConsistency,
    pub timeout: Option<Duration>,
    pub flex_index: bool,
}

impl QueryRequest {
    /// `(field, value)` pairs with every parameter resolved.
    pub fn bound_predicates(&self) -> StoreResult<Vec<(&str, JsonValue)>> {
        self.predicates
            .iter()
            .map(|p| {
                let value = match &p.value {
                    PredicateValue::Literal(value) => value.clone(),
                    PredicateValue::Parameter(name) => self.bind(name)?,
                };
                Ok((p.field.as_str(), value))
            })
            .collect()
    }

    fn bind(&self, placeholder: &str) -> StoreResult<JsonValue> {
        let bound = match &self.parameters {
            QueryParameters::Positional(values) => placeholder
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| values.get(i)),
            QueryParameters::Named(values) => values.get(placeholder),
            QueryParameters::None => None,
        };
        bound
            .cloned()
            .ok_or_else(|| StoreError::Other(format!("No value bound for ${}", placeholder)))
    }
}
