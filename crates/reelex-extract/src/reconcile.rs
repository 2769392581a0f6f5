//! Field reconciliation: fit a loosely-typed model response onto a
//! target strict schema's declared fields.
//!
//! Keys that exactly match a declared field name are recognized;
//! everything else is diverted into the envelope's `additional_context`
//! side channel. A handful of per-category cleanup heuristics run
//! before the partition is sealed. This step never fails; construction
//! failure is the orchestrator's concern.

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use reelex_core::defaults::{
    NAME_MAX_CHARS, WORKOUT_DEFAULT_DIFFICULTY, WORKOUT_DEFAULT_DURATION_MINUTES,
};
use reelex_core::Category;

/// Item-level key aliases treated as "name" inside object lists.
const ITEM_NAME_ALIASES: &[&str] = &["item", "exercise", "activity", "product"];

/// Partition a raw response into a mapping ready for strict
/// construction. The returned map carries the forced category
/// discriminator, per-category defaults, and every unrecognized key
/// merged into `additional_context`.
pub fn reconcile(category: Category, raw: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    let declared = category.declared_fields();
    let mut recognized = Map::new();
    let mut extras = Map::new();

    for (key, value) in raw {
        if declared.contains(&key.as_str()) {
            recognized.insert(key.clone(), value.clone());
        } else {
            extras.insert(key.clone(), value.clone());
        }
    }

    for field in category.item_list_fields() {
        if let Some(JsonValue::Array(items)) = recognized.get_mut(*field) {
            for item in items {
                if let Some(obj) = item.as_object_mut() {
                    normalize_item_keys(obj);
                }
            }
        }
    }

    // The discriminator is owned by the target schema, never by the
    // model's own claim.
    recognized.insert(
        "category".to_string(),
        JsonValue::String(category.as_str().to_string()),
    );

    apply_category_defaults(category, &mut recognized);

    if !extras.is_empty() {
        debug!(
            category = %category,
            extras = extras.len(),
            "Diverting unrecognized fields to additional_context"
        );
        merge_into_context(&mut recognized, extras);
    }

    recognized
}

/// Normalize known aliases for an item's "name" key and trim the name
/// to its first line, capped at [`NAME_MAX_CHARS`] characters.
pub(crate) fn normalize_item_keys(item: &mut Map<String, JsonValue>) {
    if !item.contains_key("name") {
        for alias in ITEM_NAME_ALIASES {
            if let Some(value) = item.remove(*alias) {
                item.insert("name".to_string(), value);
                break;
            }
        }
    }
    if let Some(JsonValue::String(name)) = item.get_mut("name") {
        *name = tidy_name(name);
    }
}

/// First line only, at most [`NAME_MAX_CHARS`] characters. A
/// data-quality guard against verbose model output; never fails.
pub(crate) fn tidy_name(name: &str) -> String {
    let first_line = name.lines().next().unwrap_or("").trim();
    first_line
        .chars()
        .take(NAME_MAX_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Category-specific defaults for fields the schema effectively
/// requires but the model commonly omits. Keeps the strict-validation
/// attempt viable for otherwise-good responses.
fn apply_category_defaults(category: Category, fields: &mut Map<String, JsonValue>) {
    if category == Category::Workout {
        ensure_default(
            fields,
            "estimated_duration_minutes",
            JsonValue::from(WORKOUT_DEFAULT_DURATION_MINUTES),
        );
        ensure_default(
            fields,
            "difficulty_level",
            JsonValue::String(WORKOUT_DEFAULT_DIFFICULTY.to_string()),
        );
    }
}

fn ensure_default(fields: &mut Map<String, JsonValue>, key: &str, default: JsonValue) {
    match fields.get(key) {
        None | Some(JsonValue::Null) => {
            fields.insert(key.to_string(), default);
        }
        _ => {}
    }
}

/// Merge extras key-by-key into `additional_context`, creating it if
/// absent. A non-object context from the model is preserved under its
/// own key before the merge so nothing is dropped.
fn merge_into_context(recognized: &mut Map<String, JsonValue>, extras: Map<String, JsonValue>) {
    let mut context = match recognized.remove("additional_context") {
        Some(JsonValue::Object(existing)) => existing,
        Some(other) => {
            let mut fresh = Map::new();
            fresh.insert("additional_context".to_string(), other);
            fresh
        }
        None => Map::new(),
    };
    for (key, value) in extras {
        context.insert(key, value);
    }
    recognized.insert("additional_context".to_string(), JsonValue::Object(context));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_exact_matches_recognized_rest_diverted() {
        let raw = as_map(json!({
            "title": "5 Min Abs",
            "exercise_list": [{"exercise": "Crunches", "reps": 20}],
            "trainer_tip": "breathe out on exertion",
        }));
        let reconciled = reconcile(Category::Workout, &raw);

        assert_eq!(reconciled["title"], "5 Min Abs");
        assert!(reconciled.get("exercise_list").is_none());
        let context = reconciled["additional_context"].as_object().unwrap();
        assert!(context.contains_key("exercise_list"));
        assert_eq!(context["trainer_tip"], "breathe out on exertion");
    }

    #[test]
    fn test_category_always_forced_to_target() {
        let raw = as_map(json!({"category": "music", "exercises": [{"name": "Squats"}]}));
        let reconciled = reconcile(Category::Workout, &raw);
        assert_eq!(reconciled["category"], "workout");
    }

    #[test]
    fn test_item_alias_normalized_to_name() {
        let raw = as_map(json!({
            "exercises": [
                {"exercise": "Crunches", "reps": 20},
                {"name": "Plank", "duration_seconds": 30},
            ],
        }));
        let reconciled = reconcile(Category::Workout, &raw);
        let exercises = reconciled["exercises"].as_array().unwrap();
        assert_eq!(exercises[0]["name"], "Crunches");
        assert!(exercises[0].get("exercise").is_none());
        assert_eq!(exercises[1]["name"], "Plank");
    }

    #[test]
    fn test_verbose_name_trimmed_to_first_line_and_cap() {
        let long_name = format!("{}\nwith a second line", "Crunches ".repeat(20));
        let raw = as_map(json!({"exercises": [{"name": long_name}]}));
        let reconciled = reconcile(Category::Workout, &raw);
        let name = reconciled["exercises"][0]["name"].as_str().unwrap();
        assert!(name.chars().count() <= NAME_MAX_CHARS);
        assert!(!name.contains('\n'));
    }

    #[test]
    fn test_workout_defaults_applied_when_absent_or_null() {
        let raw = as_map(json!({
            "exercises": [{"name": "Squats"}],
            "estimated_duration_minutes": null,
        }));
        let reconciled = reconcile(Category::Workout, &raw);
        assert_eq!(reconciled["estimated_duration_minutes"], 20.0);
        assert_eq!(reconciled["difficulty_level"], "intermediate");
    }

    #[test]
    fn test_workout_defaults_do_not_override_present_values() {
        let raw = as_map(json!({
            "exercises": [{"name": "Squats"}],
            "estimated_duration_minutes": 45.0,
            "difficulty_level": "advanced",
        }));
        let reconciled = reconcile(Category::Workout, &raw);
        assert_eq!(reconciled["estimated_duration_minutes"], 45.0);
        assert_eq!(reconciled["difficulty_level"], "advanced");
    }

    #[test]
    fn test_no_defaults_for_other_categories() {
        let raw = as_map(json!({"destination": "Paris"}));
        let reconciled = reconcile(Category::Travel, &raw);
        assert!(reconciled.get("estimated_duration_minutes").is_none());
    }

    #[test]
    fn test_extras_merge_into_model_supplied_context() {
        let raw = as_map(json!({
            "additional_context": {"hashtags": ["#fit"]},
            "trainer_tip": "hydrate",
        }));
        let reconciled = reconcile(Category::Workout, &raw);
        let context = reconciled["additional_context"].as_object().unwrap();
        assert_eq!(context["hashtags"], json!(["#fit"]));
        assert_eq!(context["trainer_tip"], "hydrate");
    }

    #[test]
    fn test_non_object_context_preserved_not_dropped() {
        let raw = as_map(json!({
            "additional_context": "free text",
            "trainer_tip": "hydrate",
        }));
        let reconciled = reconcile(Category::Workout, &raw);
        let context = reconciled["additional_context"].as_object().unwrap();
        assert_eq!(context["additional_context"], "free text");
        assert_eq!(context["trainer_tip"], "hydrate");
    }

    #[test]
    fn test_recipe_item_lists_normalized() {
        let raw = as_map(json!({
            "ingredients": [{"item": "Flour", "quantity": "2 cups"}],
            "steps": [{"step_number": 1, "instruction": "Mix"}],
        }));
        let reconciled = reconcile(Category::Recipe, &raw);
        assert_eq!(reconciled["ingredients"][0]["name"], "Flour");
        assert_eq!(reconciled["steps"][0]["instruction"], "Mix");
    }

    #[test]
    fn test_tidy_name_plain_short_name_unchanged() {
        assert_eq!(tidy_name("Crunches"), "Crunches");
    }
}
