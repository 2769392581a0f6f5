//! Fallback formatting: when strict construction fails, restructure the
//! original raw response into a field-normalized generic record.
//!
//! The guarantee is losslessness: every key of the raw response appears
//! in the formatted output, either under a normalized alias or under
//! its original name.

use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use reelex_core::defaults::{FALLBACK_CONFIDENCE, FALLBACK_REASON_KEY, ORIGINAL_CATEGORY_KEY};
use reelex_core::{Category, Error, GenericExtraction, Result};

use crate::reconcile::normalize_item_keys;

/// Fixed diagnostic recorded under `_fallback_reason`.
const FALLBACK_REASON: &str = "strict schema validation failed; raw response preserved";

/// Broad alias sets for common field names. A key matches an alias
/// exactly or by `_<alias>` suffix (so `exercise_list` normalizes to
/// `items`, `video_title` to `title`).
const TITLE_ALIASES: &[&str] = &[
    "title",
    "name",
    "recipe_name",
    "workout_name",
    "song_title",
    "topic",
];
const DESCRIPTION_ALIASES: &[&str] = &["description", "desc", "summary", "overview", "notes"];
const ITEMS_ALIASES: &[&str] = &[
    "items",
    "list",
    "ingredients",
    "exercises",
    "activities",
    "products",
    "steps",
];

/// A top-level JSON array becomes `{"items": [...]}` so downstream
/// logic can always assume an object.
pub fn wrap_top_level_array(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(items) => {
            let mut wrapped = Map::new();
            wrapped.insert("items".to_string(), JsonValue::Array(items));
            JsonValue::Object(wrapped)
        }
        other => other,
    }
}

fn alias_matches(key: &str, alias: &str) -> bool {
    key == alias || key.ends_with(&format!("_{alias}"))
}

/// Pick the raw key claimed for `canonical`, if any. The canonical key
/// itself always wins; otherwise aliases are tried in priority order.
fn claim_alias(obj: &Map<String, JsonValue>, canonical: &str, aliases: &[&str]) -> Option<String> {
    if obj.contains_key(canonical) {
        return None;
    }
    for alias in aliases {
        if let Some(key) = obj.keys().find(|k| alias_matches(k, alias)) {
            return Some(key.clone());
        }
    }
    None
}

/// Field-normalize a raw response object. Claimed aliases are renamed
/// to their canonical field; every other key is copied verbatim in
/// original order. Also returns the claimed alias names so callers can
/// tell renamed keys from genuinely absent ones.
fn normalize_fields(obj: &Map<String, JsonValue>) -> (Map<String, JsonValue>, Vec<String>) {
    let mut renames: Map<String, JsonValue> = Map::new();
    for (canonical, aliases) in [
        ("title", TITLE_ALIASES),
        ("description", DESCRIPTION_ALIASES),
        ("items", ITEMS_ALIASES),
    ] {
        if let Some(claimed) = claim_alias(obj, canonical, aliases) {
            renames.insert(claimed, JsonValue::String(canonical.to_string()));
        }
    }

    let mut out = Map::new();
    for (key, value) in obj {
        let target = renames
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(key.as_str());
        out.insert(target.to_string(), value.clone());
    }

    for value in out.values_mut() {
        if let JsonValue::Array(items) = value {
            for item in items {
                if let Some(item_obj) = item.as_object_mut() {
                    normalize_item_keys(item_obj);
                }
            }
        }
    }
    let claimed = renames.keys().cloned().collect();
    (out, claimed)
}

/// Build the generic fallback record from the original
/// (pre-reconciliation) raw response.
///
/// `extra_context` is the `additional_context` the reconciliation step
/// had already separated out; its keys are folded back in unless the
/// formatted output already carries them, so the two code paths never
/// duplicate-and-lose information.
///
/// Fails only on deeply malformed input (a scalar response that cannot
/// be shaped into a mapping) — that is terminal for this analysis.
pub fn build_generic(
    category: Category,
    raw: &JsonValue,
    extra_context: Option<Map<String, JsonValue>>,
) -> Result<GenericExtraction> {
    let wrapped = wrap_top_level_array(raw.clone());
    let obj = match wrapped.as_object() {
        Some(obj) => obj,
        None => {
            return Err(Error::Internal(format!(
                "generic fallback construction failed; payload is not an object: {raw}"
            )))
        }
    };

    let (mut formatted, claimed) = normalize_fields(obj);

    if let Some(context) = extra_context {
        let unseen: Map<String, JsonValue> = context
            .into_iter()
            .filter(|(key, _)| !formatted.contains_key(key) && !claimed.contains(key))
            .collect();
        if !unseen.is_empty() {
            let mut merged = match formatted.remove("additional_context") {
                Some(JsonValue::Object(existing)) => existing,
                Some(other) => {
                    let mut fresh = Map::new();
                    fresh.insert("additional_context".to_string(), other);
                    fresh
                }
                None => Map::new(),
            };
            for (key, value) in unseen {
                merged.entry(key).or_insert(value);
            }
            formatted.insert("additional_context".to_string(), JsonValue::Object(merged));
        }
    }

    formatted.insert(
        ORIGINAL_CATEGORY_KEY.to_string(),
        JsonValue::String(category.schema_name().to_string()),
    );
    formatted.insert(
        FALLBACK_REASON_KEY.to_string(),
        JsonValue::String(FALLBACK_REASON.to_string()),
    );

    let title = formatted
        .get("title")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let description = formatted
        .get("description")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let confidence = match formatted.get("confidence_score").and_then(|v| v.as_f64()) {
        Some(score) => (score / 2.0).clamp(0.0, 1.0),
        None => FALLBACK_CONFIDENCE,
    };
    let source_url = formatted
        .get("source_url")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    warn!(
        category = %category,
        schema = category.schema_name(),
        fields = formatted.len(),
        "Constructed generic fallback record"
    );

    let mut record = GenericExtraction::new(
        category.as_str(),
        title,
        description,
        confidence,
        formatted,
    );
    record.source_url = source_url;
    Ok(record)
}
