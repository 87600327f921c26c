//! Document codec backed by serde_json.

use super::error::{JsonError, JsonResult};
use crate::document::Document;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Contract for translating documents to and from their JSON text form.
pub trait TranslationService: Send + Sync {
    /// Encode a document as compact JSON. Non-ASCII text is written as UTF-8,
    /// never as `\u` escapes.
    fn encode(&self, source: &Document) -> JsonResult<String>;

    /// Parse `source` and merge its attributes into `target`.
    fn decode(&self, source: &str, target: &mut Document) -> JsonResult<()>;

    /// Parse `source` straight into an arbitrary shape, without a document wrapper.
    fn decode_fragment<T: DeserializeOwned>(&self, source: &str) -> JsonResult<T>
    where
        Self: Sized;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTranslationService;

impl JsonTranslationService {
    pub fn new() -> Self {
        Self
    }
}

impl TranslationService for JsonTranslationService {
    fn encode(&self, source: &Document) -> JsonResult<String> {
        serde_json::to_string(source.content()).map_err(|e| JsonError::EncodeError(e.to_string()))
    }

    fn decode(&self, source: &str, target: &mut Document) -> JsonResult<()> {
        match serde_json::from_str::<JsonValue>(source)? {
            JsonValue::Object(map) => {
                for (key, value) in map {
                    target.put(key, value);
                }
                Ok(())
            }
            JsonValue::Array(_) => Err(JsonError::InvalidStructure(
                "expected a JSON object, found an array".to_string(),
            )),
            _ => Err(JsonError::InvalidStructure(
                "JSON to decode needs to start as an object".to_string(),
            )),
        }
    }

    fn decode_fragment<T: DeserializeOwned>(&self, source: &str) -> JsonResult<T> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct LanguageFragment {
        language: Option<String>,
    }

    #[test]
    fn test_encode_non_ascii_as_utf8() {
        let service = JsonTranslationService::new();
        let mut doc = Document::with_id("key");
        doc.put("language", "русский");

        assert_eq!(service.encode(&doc).unwrap(), r#"{"language":"русский"}"#);
    }

    #[test]
    fn test_decode_non_ascii() {
        let service = JsonTranslationService::new();
        let mut target = Document::new();
        service.decode(r#"{"language":"русский"}"#, &mut target).unwrap();

        assert_eq!(target.get_str("language"), Some("русский"));
    }

    #[test]
    fn test_decode_fragment() {
        let service = JsonTranslationService::new();
        let fragment: LanguageFragment = service.decode_fragment(r#"{"language":"french"}"#).unwrap();
        assert_eq!(fragment.language.as_deref(), Some("french"));
    }

    #[test]
    fn test_decode_fragment_missing_and_null() {
        let service = JsonTranslationService::new();
        let missing: LanguageFragment = service.decode_fragment("{}").unwrap();
        let null: LanguageFragment = service.decode_fragment(r#"{"language":null}"#).unwrap();
        assert!(missing.language.is_none());
        assert!(null.language.is_none());
    }

    #[test]
    fn test_decode_keeps_explicit_null() {
        let service = JsonTranslationService::new();
        let source = r#"{"language":null}"#;
        let mut target = Document::new();
        service.decode(source, &mut target).unwrap();

        assert_eq!(target.get("language"), Some(&JsonValue::Null));
        assert_eq!(service.encode(&target).unwrap(), source);
    }

    #[test]
    fn test_decode_nested() {
        let service = JsonTranslationService::new();
        let mut target = Document::new();
        service
            .decode(r#"{"a":{"b":[1,2.5,"x",null,true]}}"#, &mut target)
            .unwrap();
        assert_eq!(target.get("a"), Some(&json!({"b": [1, 2.5, "x", null, true]})));
    }

    #[test]
    fn test_decode_malformed() {
        let service = JsonTranslationService::new();
        let mut target = Document::new();
        let err = service.decode(r#"{"language": "#, &mut target).unwrap_err();
        assert!(matches!(err, JsonError::ParseError(_)));

        let err = service.decode_fragment::<LanguageFragment>("not json").unwrap_err();
        assert!(matches!(err, JsonError::ParseError(_)));
    }

    #[test]
    fn test_decode_rejects_non_object_roots() {
        let service = JsonTranslationService::new();
        let mut target = Document::new();
        assert!(matches!(
            service.decode("[1,2]", &mut target),
            Err(JsonError::InvalidStructure(_))
        ));
        assert!(matches!(
            service.decode("42", &mut target),
            Err(JsonError::InvalidStructure(_))
        ));
    }
}
