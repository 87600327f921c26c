use super::consistency::ScanConsistency;
use crate::storage::{Predicate, PredicateValue, QueryRequest};
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;

/// Values bound to `$1`/`$name` placeholders in predicate values.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryParameters {
    #[default]
    None,
    Positional(Vec<JsonValue>),
    Named(Map<String, JsonValue>),
}

/// A structured document query.
///
/// Predicates are field equality tests joined with `AND`. Values given to
/// [`Query::where_eq`] are always literals; [`Query::where_param`] refers to
/// a positional or named parameter bound by the store.
///
/// ```ignore
/// let query = Query::new()
///     .where_param("city", "1")
///     .positional_parameters(vec![json!("Paris")])
///     .consistency(ScanConsistency::RequestPlus);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    predicates: Vec<Predicate>,
    limit: Option<usize>,
    parameters: QueryParameters,
    consistency: Option<ScanConsistency>,
    timeout: Option<Duration>,
    flex_index: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.predicates.push(Predicate {
            field: field.into(),
            value: PredicateValue::Literal(value.into()),
        });
        self
    }

    /// Compare `field` with a parameter: a 1-based position (`"1"`) or a
    /// name (`"city"`). A leading `$` is accepted and ignored.
    pub fn where_param(mut self, field: impl Into<String>, parameter: &str) -> Self {
        let name = parameter.strip_prefix('$').unwrap_or(parameter);
        self.predicates.push(Predicate {
            field: field.into(),
            value: PredicateValue::Parameter(name.to_string()),
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn positional_parameters(mut self, values: Vec<JsonValue>) -> Self {
        self.parameters = QueryParameters::Positional(values);
        self
    }

    pub fn named_parameter(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        let mut named = match std::mem::take(&mut self.parameters) {
            QueryParameters::Named(map) => map,
            _ => Map::new(),
        };
        named.insert(name.into(), value.into());
        self.parameters = QueryParameters::Named(named);
        self
    }

    /// Override the executor's default scan consistency for this query.
    pub fn consistency(mut self, consistency: ScanConsistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ask the store to use a full-text index for this query.
    pub fn flex_index(mut self, flex: bool) -> Self {
        self.flex_index = flex;
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn parameters(&self) -> &QueryParameters {
        &self.parameters
    }

    pub fn scan_consistency(&self) -> Option<ScanConsistency> {
        self.consistency
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn uses_flex_index(&self) -> bool {
        self.flex_index
    }

    /// Render the query as a N1QL statement against `bucket`.
    pub fn statement(&self, bucket: &str) -> String {
        let mut statement = format!(
            "SELECT META(`{b}`).id AS __id, META(`{b}`).cas AS __cas, `{b}`.* FROM `{b}`",
            b = bucket
        );
        if !self.predicates.is_empty() {
            let clauses: Vec<String> = self
                .predicates
                .iter()
                .map(|p| format!("`{}` = {}", p.field, render_value(&p.value)))
                .collect();
            statement.push_str(" WHERE ");
            statement.push_str(&clauses.join(" AND "));
        }
        if let Some(limit) = self.limit {
            statement.push_str(&format!(" LIMIT {}", limit));
        }
        statement
    }

    pub(crate) fn to_request(
        &self,
        bucket: &str,
        consistency: ScanConsistency,
        timeout: Option<Duration>,
    ) -> QueryRequest {
        QueryRequest {
            statement: self.statement(bucket),
            predicates: self.predicates.clone(),
            parameters: self.parameters.clone(),
            limit: self.limit,
            consistency,
            timeout,
            flex_index: self.flex_index,
        }
    }
}

fn render_value(value: &PredicateValue) -> String {
    match value {
        PredicateValue::Literal(value) => value.to_string(),
        PredicateValue::Parameter(name) => format!("${}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statement_rendering() {
        let query = Query::new()
            .where_param("city", "1")
            .where_eq("active", true)
            .where_eq("currency", "$")
            .limit(5);

        assert_eq!(
            query.statement("travel"),
            "SELECT META(`travel`).id AS __id, META(`travel`).cas AS __cas, `travel`.* FROM `travel` \
             WHERE `city` = $1 AND `active` = true AND `currency` = \"$\" LIMIT 5"
        );
    }

    #[test]
    fn test_named_parameters_accumulate() {
        let query = Query::new()
            .named_parameter("a", 1)
            .named_parameter("b", "x");
        match query.parameters() {
            QueryParameters::Named(map) => {
                assert_eq!(map.get("a"), Some(&json!(1)));
                assert_eq!(map.get("b"), Some(&json!("x")));
            }
            other => panic!("unexpected parameters {:?}", other),
        }
    }

    #[test]
    fn test_consistency_is_unset_by_default() {
        assert_eq!(Query::new().scan_consistency(), None);
        assert_eq!(
            Query::new()
                .consistency(ScanConsistency::RequestPlus)
                .scan_consistency(),
            Some(ScanConsistency::RequestPlus)
        );
    }
}
