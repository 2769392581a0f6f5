//! Response-text unwrapping and parsing.
//!
//! Backends return either raw JSON text, JSON inside a ```json fenced
//! block, or JSON inside a bare fenced block. All three forms unwrap
//! identically before parsing.

use regex::Regex;
use serde_json::Value as JsonValue;

use reelex_core::{Error, Result};

/// Strip a markdown code fence wrapper if one is present.
///
/// Returns the inner text of the first fenced block, or the trimmed
/// input when no fence is found.
pub fn unwrap_code_fence(text: &str) -> String {
    let fence = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap();
    match fence.captures(text) {
        Some(caps) => caps[1].trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Unwrap fences and parse the response text as JSON.
///
/// A parse failure here is terminal for the current analysis: it is a
/// transport-shaped error, not a schema mismatch, so it never triggers
/// the generic fallback.
pub fn parse_json_response(text: &str) -> Result<JsonValue> {
    let unwrapped = unwrap_code_fence(text);
    serde_json::from_str(&unwrapped).map_err(|e| {
        Error::Parse(format!(
            "response is not valid JSON: {e} (first 120 chars: {:?})",
            unwrapped.chars().take(120).collect::<String>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_json_passes_through() {
        let parsed = parse_json_response(r#"{"title": "5 Min Abs"}"#).unwrap();
        assert_eq!(parsed, json!({"title": "5 Min Abs"}));
    }

    #[test]
    fn test_json_fence_unwraps() {
        let text = "```json\n{\"title\": \"5 Min Abs\"}\n```";
        let parsed = parse_json_response(text).unwrap();
        assert_eq!(parsed["title"], "5 Min Abs");
    }

    #[test]
    fn test_bare_fence_unwraps() {
        let text = "```\n{\"title\": \"5 Min Abs\"}\n```";
        let parsed = parse_json_response(text).unwrap();
        assert_eq!(parsed["title"], "5 Min Abs");
    }

    #[test]
    fn test_fence_with_surrounding_prose() {
        let text = "Here you go:\n```json\n[1, 2, 3]\n```\nLet me know!";
        let parsed = parse_json_response(text).unwrap();
        assert_eq!(parsed, json!([1, 2, 3]));
    }

    #[test]
    fn test_top_level_array_parses_as_array() {
        let parsed = parse_json_response(r#"[{"name":"Paris"},{"name":"Lyon"}]"#).unwrap();
        assert!(parsed.is_array());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_json_response("the video shows a workout").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_unwrap_is_idempotent_on_unfenced_text() {
        assert_eq!(unwrap_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    }
}
