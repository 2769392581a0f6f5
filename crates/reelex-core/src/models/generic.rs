//! Permissive fallback record used when strict validation fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::defaults::FALLBACK_CONFIDENCE;

/// Catch-all extraction record.
///
/// `category` is a free-form string (it must tolerate "unknown" or any
/// model-supplied label), `raw_data` holds the full field-normalized
/// response including the `_original_category` and `_fallback_reason`
/// provenance markers, and any extra top-level fields beyond `raw_data`
/// are accepted via the flattened `extra` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericExtraction {
    pub category: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub extracted_at: DateTime<Utc>,
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,
    pub raw_data: Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

fn default_confidence() -> f64 {
    FALLBACK_CONFIDENCE
}

impl GenericExtraction {
    /// Build a fallback record. Out-of-range confidence is clamped
    /// rather than rejected; the fallback path must not fail on a bad
    /// score.
    pub fn new(
        category: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
        confidence_score: f64,
        raw_data: Map<String, JsonValue>,
    ) -> Self {
        Self {
            category: category.into(),
            title,
            description,
            source_url: None,
            extracted_at: Utc::now(),
            confidence_score: confidence_score.clamp(0.0, 1.0),
            raw_data,
            keyframes: Vec::new(),
            extra: Map::new(),
        }
    }
}
