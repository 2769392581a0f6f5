//! Schema sanitization for the generation backend.
//!
//! The registry's schema descriptors carry cross-references and
//! metadata keywords the backend's structured-output feature does not
//! accept. Sanitization inlines every named reference and keeps only
//! the structural keywords the backend is known to support.
//!
//! Sanitization is pure and total: well-formed input never fails, and
//! malformed input (a pointer to a definition that does not exist)
//! passes through as best-effort partial pruning — the backend will
//! reject an outright-invalid schema with its own diagnosable error.

use serde_json::{Map, Value as JsonValue};

/// Keywords the backend accepts. Everything else is stripped at every
/// nesting level.
const STRUCTURAL_KEYWORDS: &[&str] = &["type", "properties", "items", "required", "enum"];

/// Section names under which shared sub-definitions may be declared.
const DEFS_KEYS: &[&str] = &["$defs", "definitions", "defs"];

/// Reference chains deeper than this are treated as cyclic and left
/// unresolved (the registry's schemas are cycle-free by construction).
const MAX_REF_DEPTH: usize = 32;

/// Produce an equivalent descriptor containing only structural keywords
/// and zero reference pointers.
pub fn sanitize_schema(schema: &JsonValue) -> JsonValue {
    let defs = collect_defs(schema);
    sanitize_node(schema, &defs, 0)
}

fn collect_defs(schema: &JsonValue) -> Map<String, JsonValue> {
    let mut defs = Map::new();
    if let Some(obj) = schema.as_object() {
        for key in DEFS_KEYS {
            if let Some(JsonValue::Object(section)) = obj.get(*key) {
                for (name, definition) in section {
                    defs.insert(name.clone(), definition.clone());
                }
            }
        }
    }
    defs
}

/// Resolve a `#/<defs-key>/<name>` pointer to its definition name.
fn ref_target(pointer: &str) -> Option<&str> {
    pointer.strip_prefix("#/")?.rsplit('/').next()
}

fn sanitize_node(node: &JsonValue, defs: &Map<String, JsonValue>, depth: usize) -> JsonValue {
    let obj = match node.as_object() {
        Some(obj) => obj,
        None => return node.clone(),
    };

    // Reference inlining: replace the pointer with a deep copy of the
    // referenced definition, recursively. An unresolvable pointer (or a
    // chain deep enough to be cyclic) is left in place.
    if let Some(JsonValue::String(pointer)) = obj.get("$ref") {
        if depth < MAX_REF_DEPTH {
            if let Some(definition) = ref_target(pointer).and_then(|name| defs.get(name)) {
                return sanitize_node(definition, defs, depth + 1);
            }
        }
        return node.clone();
    }

    let mut cleaned = Map::new();
    for (key, value) in obj {
        if !STRUCTURAL_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        match key.as_str() {
            // Property names are data, not keywords: recurse into each
            // value but keep every name.
            "properties" => {
                if let Some(props) = value.as_object() {
                    let sanitized: Map<String, JsonValue> = props
                        .iter()
                        .map(|(name, prop)| (name.clone(), sanitize_node(prop, defs, depth)))
                        .collect();
                    cleaned.insert(key.clone(), JsonValue::Object(sanitized));
                } else {
                    cleaned.insert(key.clone(), value.clone());
                }
            }
            "items" => {
                let sanitized = match value {
                    JsonValue::Array(items) => JsonValue::Array(
                        items.iter().map(|i| sanitize_node(i, defs, depth)).collect(),
                    ),
                    other => sanitize_node(other, defs, depth),
                };
                cleaned.insert(key.clone(), sanitized);
            }
            _ => {
                cleaned.insert(key.clone(), value.clone());
            }
        }
    }

    prune_required(&mut cleaned);
    JsonValue::Object(cleaned)
}

/// Filter a "required" list down to field names still present under the
/// sibling "properties" map; drop the key entirely when nothing is left.
fn prune_required(obj: &mut Map<String, JsonValue>) {
    let Some(JsonValue::Array(required)) = obj.get("required") else {
        return;
    };
    let known: Vec<JsonValue> = match obj.get("properties").and_then(|p| p.as_object()) {
        Some(props) => required
            .iter()
            .filter(|name| {
                name.as_str()
                    .map(|n| props.contains_key(n))
                    .unwrap_or(false)
            })
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    if known.is_empty() {
        obj.remove("required");
    } else {
        obj.insert("required".to_string(), JsonValue::Array(known));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_keywords_stripped_at_every_level() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "title": "WorkoutRoutine",
            "type": "object",
            "description": "a workout",
            "properties": {
                "name": {"type": "string", "description": "...", "default": "x", "format": "hint"},
            },
        });
        let sanitized = sanitize_schema(&schema);
        assert_eq!(
            sanitized,
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
            })
        );
    }

    #[test]
    fn test_reference_inlining_scenario() {
        let schema = json!({
            "type": "object",
            "properties": {"exercises": {"$ref": "#/defs/Exercise"}},
            "defs": {
                "Exercise": {
                    "type": "object",
                    "properties": {"name": {"type": "string", "description": "..."}},
                    "description": "an exercise",
                },
            },
        });
        let sanitized = sanitize_schema(&schema);
        assert_eq!(
            sanitized,
            json!({
                "type": "object",
                "properties": {
                    "exercises": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                    },
                },
            })
        );
    }

    #[test]
    fn test_nested_reference_chains_inline_recursively() {
        let schema = json!({
            "type": "object",
            "properties": {"steps": {"type": "array", "items": {"$ref": "#/$defs/Step"}}},
            "$defs": {
                "Step": {
                    "type": "object",
                    "properties": {"tool": {"$ref": "#/$defs/Tool"}},
                },
                "Tool": {"type": "string", "title": "Tool"},
            },
        });
        let sanitized = sanitize_schema(&schema);
        assert_eq!(
            sanitized["properties"]["steps"]["items"]["properties"]["tool"],
            json!({"type": "string"})
        );
    }

    #[test]
    fn test_required_pruned_to_surviving_properties() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name", "ghost"],
        });
        let sanitized = sanitize_schema(&schema);
        assert_eq!(sanitized["required"], json!(["name"]));
    }

    #[test]
    fn test_required_removed_entirely_when_empty() {
        let schema = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["ghost"],
        });
        let sanitized = sanitize_schema(&schema);
        assert!(sanitized.get("required").is_none());
    }

    #[test]
    fn test_required_removed_when_no_properties_sibling() {
        let schema = json!({"type": "object", "required": ["anything"]});
        let sanitized = sanitize_schema(&schema);
        assert_eq!(sanitized, json!({"type": "object"}));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let schema = reelex_core::Category::Workout.generation_schema();
        let once = sanitize_schema(&schema);
        let twice = sanitize_schema(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unresolvable_ref_passes_through() {
        let schema = json!({
            "type": "object",
            "properties": {"x": {"$ref": "#/$defs/Missing"}},
        });
        let sanitized = sanitize_schema(&schema);
        assert_eq!(sanitized["properties"]["x"]["$ref"], "#/$defs/Missing");
    }

    #[test]
    fn test_enum_survives_verbatim() {
        let schema = json!({
            "type": "string",
            "enum": ["beginner", "intermediate", "advanced"],
            "description": "difficulty",
        });
        let sanitized = sanitize_schema(&schema);
        assert_eq!(
            sanitized,
            json!({"type": "string", "enum": ["beginner", "intermediate", "advanced"]})
        );
    }

    #[test]
    fn test_registry_schemas_sanitize_without_pointers() {
        for category in reelex_core::Category::ALL {
            let sanitized = sanitize_schema(&category.generation_schema());
            let text = sanitized.to_string();
            assert!(!text.contains("$ref"), "{category}: leftover $ref");
            assert!(!text.contains("$defs"), "{category}: leftover $defs");
            assert!(!text.contains("$schema"), "{category}: leftover $schema");
        }
    }
}
