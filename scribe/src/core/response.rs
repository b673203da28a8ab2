//! Best-effort interpretation of generation agent output.
//!
//! Agents either print the article directly or wrap it in a JSON envelope.
//! Parsing never fails: anything that is not a JSON object is raw text.

use serde_json::{Map, Value};

/// Envelope fields that may carry the article, highest priority first.
pub const ARTICLE_FIELDS: [&str; 4] = ["response", "output", "content", "message"];

/// Parsed agent stdout.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResponse {
    /// Stdout parsed as a JSON object.
    Structured(Map<String, Value>),
    /// Stdout that is not a JSON object, kept verbatim.
    Raw(String),
}

impl AgentResponse {
    pub fn parse(stdout: &str) -> Self {
        match serde_json::from_str::<Value>(stdout.trim()) {
            Ok(Value::Object(map)) => AgentResponse::Structured(map),
            _ => AgentResponse::Raw(stdout.to_string()),
        }
    }

    /// Resolve the article text.
    ///
    /// For an envelope, the first non-blank string among [`ARTICLE_FIELDS`]
    /// wins; an envelope without one yields `raw` verbatim.
    pub fn into_article(self, raw: &str) -> String {
        match self {
            AgentResponse::Raw(text) => text,
            AgentResponse::Structured(map) => {
                prioritized_field(&map).map_or_else(|| raw.to_string(), str::to_string)
            }
        }
    }
}

fn prioritized_field(map: &Map<String, Value>) -> Option<&str> {
    ARTICLE_FIELDS.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
    })
}

/// Parse stdout and extract the article in one step.
pub fn extract_article(stdout: &str) -> String {
    AgentResponse::parse(stdout).into_article(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_returned_verbatim() {
        let stdout = "# Title\n\nBody text.\n";
        assert_eq!(
            AgentResponse::parse(stdout),
            AgentResponse::Raw(stdout.to_string())
        );
        assert_eq!(extract_article(stdout), stdout);
    }

    #[test]
    fn envelope_prefers_response_over_later_fields() {
        let stdout = r#"{"message":"m","content":"c","output":"o","response":"r"}"#;
        assert_eq!(extract_article(stdout), "r");
    }

    #[test]
    fn blank_fields_fall_through_to_next_priority() {
        let stdout = r#"{"response":"  ","output":"","content":"the article"}"#;
        assert_eq!(extract_article(stdout), "the article");
    }

    #[test]
    fn non_string_fields_are_skipped() {
        let stdout = r#"{"response":{"nested":true},"message":"fallback"}"#;
        assert_eq!(extract_article(stdout), "fallback");
    }

    #[test]
    fn envelope_without_known_fields_returns_raw_payload() {
        let stdout = "{\"status\":\"ok\"}\n";
        assert!(matches!(
            AgentResponse::parse(stdout),
            AgentResponse::Structured(_)
        ));
        assert_eq!(extract_article(stdout), stdout);
    }

    #[test]
    fn json_scalars_and_arrays_are_raw() {
        assert!(matches!(
            AgentResponse::parse("[1, 2]"),
            AgentResponse::Raw(_)
        ));
        assert_eq!(extract_article("\"quoted\""), "\"quoted\"");
    }

    #[test]
    fn malformed_json_falls_back_to_raw() {
        let stdout = "{\"response\": \"unterminated";
        assert_eq!(extract_article(stdout), stdout);
    }
}
