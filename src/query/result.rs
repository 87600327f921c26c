use super::consistency::ScanConsistency;
use crate::document::Document;
use crate::json::{JsonError, JsonResult, JsonTranslationService, TranslationService};
use serde_json::Value as JsonValue;

/// Row attribute carrying the document key.
pub const META_ID: &str = "__id";
/// Row attribute carrying the document CAS.
pub const META_CAS: &str = "__cas";
/// Row attribute carrying a full-text-search score.
pub const META_SCORE: &str = "__score";

/// Rows returned by a query, together with the consistency the query ran at.
#[derive(Debug, Clone)]
pub struct QueryResult {
    statement: String,
    consistency: ScanConsistency,
    rows: Vec<String>,
}

impl QueryResult {
    pub fn new(statement: String, consistency: ScanConsistency, rows: Vec<String>) -> Self {
        Self {
            statement,
            consistency,
            rows,
        }
    }

    /// Scan consistency actually used for this invocation.
    pub fn consistency(&self) -> ScanConsistency {
        self.consistency
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Raw JSON rows.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode every row into a [`Document`], moving `__id` into the document key.
    /// The optional score is returned alongside each document.
    pub fn documents(&self) -> JsonResult<Vec<(Document, Option<f64>)>> {
        let codec = JsonTranslationService::new();
        self.rows
            .iter()
            .map(|row| {
                let mut doc = Document::new();
                codec.decode(row, &mut doc)?;
                match doc.remove(META_ID) {
                    Some(JsonValue::String(id)) => {
                        doc.set_id(id);
                    }
                    Some(other) => {
                        return Err(JsonError::InvalidStructure(format!(
                            "row id must be a string, found {}",
                            other
                        )));
                    }
                    None => {}
                }
                doc.remove(META_CAS);
                let score = doc.remove(META_SCORE).and_then(|s| s.as_f64());
                Ok((doc, score))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_documents_strip_meta_attributes() {
        let result = QueryResult::new(
            "SELECT".into(),
            ScanConsistency::NotBounded,
            vec![r#"{"__id":"a","__cas":3,"__score":0.5,"name":"x"}"#.into()],
        );

        let docs = result.documents().unwrap();
        assert_eq!(docs.len(), 1);
        let (doc, score) = &docs[0];
        assert_eq!(doc.id(), Some("a"));
        assert_eq!(doc.export(), json!({"name": "x"}));
        assert_eq!(*score, Some(0.5));
    }

    #[test]
    fn test_non_string_id_rejected() {
        let result = QueryResult::new(
            "SELECT".into(),
            ScanConsistency::RequestPlus,
            vec![r#"{"__id":1}"#.into()],
        );
        assert!(matches!(result.documents(), Err(JsonError::InvalidStructure(_))));
    }
}
