//! Spec parsing into a generic key-value tree

use serde_json::{Map, Value};

use crate::error::SpecError;
use crate::extract::{extract, PayloadKind};

/// Parse spec text into a mapping.
///
/// YAML payloads (and raw ones, first) go through the YAML loader, JSON
/// payloads (and raw ones, second) through the JSON decoder. Only a mapping is
/// accepted; a syntactically valid scalar or sequence is still an error.
pub fn parse(text: &str) -> Result<Map<String, Value>, SpecError> {
    let extracted = extract(text);
    if extracted.payload.is_empty() {
        return Err(SpecError::EmptySpec);
    }

    let mut messages = Vec::new();

    if matches!(extracted.kind, PayloadKind::Yaml | PayloadKind::Raw) {
        match serde_yaml::from_str::<serde_yaml::Value>(extracted.payload) {
            Ok(value) if value.is_mapping() => match serde_json::to_value(&value) {
                Ok(Value::Object(map)) => return Ok(map),
                Ok(_) => {}
                Err(e) => messages.push(format!("YAML parse error: {}", e)),
            },
            Ok(_) => {}
            Err(e) => messages.push(format!("YAML parse error: {}", e)),
        }
    }

    if matches!(extracted.kind, PayloadKind::Json | PayloadKind::Raw) {
        match serde_json::from_str::<Value>(extracted.payload) {
            Ok(Value::Object(map)) => return Ok(map),
            Ok(_) => {}
            Err(e) => messages.push(format!("JSON parse error: {}", e)),
        }
    }

    if messages.is_empty() {
        messages.push("Parsed content is not an object/dict.".to_string());
    }
    tracing::debug!("Spec parse failed: {}", messages.join("; "));
    Err(SpecError::InvalidSpecFormat(messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fenced_yaml() {
        let text = "Some notes\n```yaml\ndocument:\n  title: Form\npages: []\n```";
        let map = parse(text).unwrap();
        assert_eq!(map["document"]["title"], json!("Form"));
        assert_eq!(map["pages"], json!([]));
    }

    #[test]
    fn test_parse_fenced_json() {
        let map = parse("```json\n{\"pages\": [{\"elements\": []}]}\n```").unwrap();
        assert!(map["pages"].is_array());
    }

    #[test]
    fn test_parse_raw_json_via_yaml_loader() {
        let map = parse(r#"{"document": {"unit": "pt"}}"#).unwrap();
        assert_eq!(map["document"]["unit"], json!("pt"));
    }

    #[test]
    fn test_empty_spec() {
        assert_eq!(parse("   \n"), Err(SpecError::EmptySpec));
        assert_eq!(parse("```yaml\n\n```"), Err(SpecError::EmptySpec));
    }

    #[test]
    fn test_scalar_rejected() {
        let err = parse("just some prose").unwrap_err();
        match err {
            // YAML accepts the scalar; the JSON decoder then fails
            SpecError::InvalidSpecFormat(messages) => {
                assert_eq!(messages.len(), 1);
                assert!(messages[0].starts_with("JSON parse error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sequence_rejected_without_decoder_errors() {
        let err = parse("[1, 2, 3]").unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidSpecFormat(vec!["Parsed content is not an object/dict.".into()])
        );
    }

    #[test]
    fn test_fenced_json_syntax_error_is_reported() {
        let err = parse("```json\n{\"a\": \n```").unwrap_err();
        let messages = err.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("JSON parse error"));
    }

    #[test]
    fn test_fenced_yaml_syntax_error_is_reported() {
        let err = parse("```yaml\na: [1, 2\n```").unwrap_err();
        let messages = err.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("YAML parse error"));
    }
}
