//! Common envelope shared by every strict category record.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::validation::FieldIssue;

/// Envelope field names, as the generation backend may return them.
/// `keyframes` is deliberately absent: it is backfilled after analysis
/// and never part of the model's own validation.
pub const ENVELOPE_FIELDS: &[&str] = &[
    "title",
    "description",
    "source_url",
    "extracted_at",
    "confidence_score",
    "additional_context",
];

/// Fields common to all category records.
///
/// `additional_context` is the extras side channel: every raw response
/// key that does not exactly match a declared field name of the target
/// schema is diverted here by the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Envelope {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub extracted_at: DateTime<Utc>,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub additional_context: Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(skip)]
    pub keyframes: Vec<String>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            source_url: None,
            extracted_at: Utc::now(),
            confidence_score: 0.0,
            additional_context: Map::new(),
            keyframes: Vec::new(),
        }
    }
}

impl Envelope {
    /// Range checks for envelope fields. Strict records reject an
    /// out-of-range confidence; only the fallback path clamps.
    pub fn validate(&self, issues: &mut Vec<FieldIssue>) {
        if !(0.0..=1.0).contains(&self.confidence_score) {
            issues.push(FieldIssue::out_of_range(
                "confidence_score",
                format!("{} outside [0, 1]", self.confidence_score),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_envelope_validates() {
        let mut issues = Vec::new();
        Envelope::default().validate(&mut issues);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_out_of_range_confidence_is_flagged() {
        let envelope = Envelope {
            confidence_score: 1.5,
            ..Default::default()
        };
        let mut issues = Vec::new();
        envelope.validate(&mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "confidence_score");
    }

    #[test]
    fn test_extracted_at_defaults_on_deserialize() {
        let envelope: Envelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.extracted_at <= Utc::now());
        assert_eq!(envelope.confidence_score, 0.0);
    }

    #[test]
    fn test_keyframes_not_in_schema_descriptor() {
        let schema = serde_json::to_value(schemars::schema_for!(Envelope)).unwrap();
        let props = schema.get("properties").unwrap().as_object().unwrap();
        assert!(props.contains_key("title"));
        assert!(!props.contains_key("keyframes"));
    }
}
