//! Structured payload extraction
//!
//! Pulls a YAML or JSON payload out of free text, tolerating Markdown code fences.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    /// First fenced block tagged yaml/yml, case-insensitive
    static ref YAML_FENCE: Regex = Regex::new(r"(?is)```(?:yaml|yml)\s*(.*?)```").unwrap();

    /// First fenced block tagged json, case-insensitive
    static ref JSON_FENCE: Regex = Regex::new(r"(?is)```json\s*(.*?)```").unwrap();
}

/// Where the payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Yaml,
    Json,
    Raw,
}

/// An extracted payload, borrowed from the input text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted<'a> {
    pub kind: PayloadKind,
    pub payload: &'a str,
}

/// Extract the structured payload from `text`.
///
/// YAML fences win over JSON fences. Without any fence the whole trimmed
/// input is returned as [`PayloadKind::Raw`]. Never fails; the payload may be empty.
pub fn extract(text: &str) -> Extracted<'_> {
    if let Some(body) = fenced_body(&YAML_FENCE, text) {
        return Extracted {
            kind: PayloadKind::Yaml,
            payload: body,
        };
    }
    if let Some(body) = fenced_body(&JSON_FENCE, text) {
        return Extracted {
            kind: PayloadKind::Json,
            payload: body,
        };
    }
    Extracted {
        kind: PayloadKind::Raw,
        payload: text.trim(),
    }
}

fn fenced_body<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_yaml_fence() {
        let text = "# Title\n\n```yaml\ndocument:\n  title: x\n```\n";
        let extracted = extract(text);
        assert_eq!(extracted.kind, PayloadKind::Yaml);
        assert_eq!(extracted.payload, "document:\n  title: x");
    }

    #[test]
    fn test_extract_yml_fence_is_case_insensitive() {
        let extracted = extract("```YML\na: 1\n```");
        assert_eq!(extracted.kind, PayloadKind::Yaml);
        assert_eq!(extracted.payload, "a: 1");
    }

    #[test]
    fn test_yaml_fence_wins_over_earlier_json_fence() {
        let text = "```json\n{\"a\": 1}\n```\n\n```yaml\nb: 2\n```";
        let extracted = extract(text);
        assert_eq!(extracted.kind, PayloadKind::Yaml);
        assert_eq!(extracted.payload, "b: 2");
    }

    #[test]
    fn test_extract_json_fence() {
        let extracted = extract("intro\n```Json\n  {\"a\": 1}  \n```");
        assert_eq!(extracted.kind, PayloadKind::Json);
        assert_eq!(extracted.payload, "{\"a\": 1}");
    }

    #[test]
    fn test_first_yaml_block_wins() {
        let extracted = extract("```yaml\nfirst: 1\n```\n```yaml\nsecond: 2\n```");
        assert_eq!(extracted.payload, "first: 1");
    }

    #[test]
    fn test_raw_fallback_trims() {
        let extracted = extract("   a: 1\n  ");
        assert_eq!(extracted.kind, PayloadKind::Raw);
        assert_eq!(extracted.payload, "a: 1");
    }

    #[test]
    fn test_empty_input() {
        let extracted = extract("");
        assert_eq!(extracted.kind, PayloadKind::Raw);
        assert!(extracted.payload.is_empty());
    }
}
