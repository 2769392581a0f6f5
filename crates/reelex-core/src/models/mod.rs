//! Category record registry.
//!
//! Six strict extraction shapes (workout, recipe, travel, product,
//! educational, music) plus the permissive generic fallback record.
//! Each strict record extends the common [`Envelope`] and exposes a
//! machine-readable schema descriptor plus a constructor that reports
//! every missing, mistyped, or out-of-range field at once.

mod envelope;
mod generic;
mod product;
mod recipe;
mod song;
mod travel;
mod tutorial;
mod validation;
mod workout;

pub use envelope::{Envelope, ENVELOPE_FIELDS};
pub use generic::GenericExtraction;
pub use product::{Product, ProductCatalog};
pub use recipe::{Ingredient, RecipeCard, RecipeStep};
pub use song::SongMetadata;
pub use travel::{Activity, TravelItinerary};
pub use tutorial::{TutorialStep, TutorialSummary};
pub use validation::{FieldIssue, ValidationError};
pub use workout::{Difficulty, Exercise, WorkoutRoutine};

use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// Category enum
// ---------------------------------------------------------------------------

/// The closed set of extraction categories.
///
/// Wire labels match what the generation backend is asked to emit and
/// what the memory store uses as container tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Workout,
    Recipe,
    Travel,
    Product,
    Educational,
    Music,
}

impl Category {
    /// All categories, in detection-prompt order.
    pub const ALL: [Category; 6] = [
        Category::Workout,
        Category::Recipe,
        Category::Travel,
        Category::Product,
        Category::Educational,
        Category::Music,
    ];

    /// Wire label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Workout => "workout",
            Category::Recipe => "recipe",
            Category::Travel => "travel",
            Category::Product => "product",
            Category::Educational => "educational",
            Category::Music => "music",
        }
    }

    /// Name of the strict schema attempted for this category.
    pub fn schema_name(&self) -> &'static str {
        match self {
            Category::Workout => WorkoutRoutine::SCHEMA_NAME,
            Category::Recipe => RecipeCard::SCHEMA_NAME,
            Category::Travel => TravelItinerary::SCHEMA_NAME,
            Category::Product => ProductCatalog::SCHEMA_NAME,
            Category::Educational => TutorialSummary::SCHEMA_NAME,
            Category::Music => SongMetadata::SCHEMA_NAME,
        }
    }

    /// Exact wire-label lookup.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == label)
    }

    /// Match a raw classification response against the closed label set:
    /// exact match first, then substring (the backend sometimes pads the
    /// label with prose).
    pub fn match_response(response: &str) -> Option<Category> {
        let normalized = response.trim().to_lowercase();
        if let Some(cat) = Category::from_label(&normalized) {
            return Some(cat);
        }
        Category::ALL
            .iter()
            .copied()
            .find(|c| normalized.contains(c.as_str()))
    }

    /// Every field name the strict schema for this category declares,
    /// envelope fields included. Used by the reconciler to partition a
    /// raw response into recognized fields vs extras.
    pub fn declared_fields(&self) -> Vec<&'static str> {
        let specific: &[&str] = match self {
            Category::Workout => WorkoutRoutine::FIELDS,
            Category::Recipe => RecipeCard::FIELDS,
            Category::Travel => TravelItinerary::FIELDS,
            Category::Product => ProductCatalog::FIELDS,
            Category::Educational => TutorialSummary::FIELDS,
            Category::Music => SongMetadata::FIELDS,
        };
        let mut fields = vec!["category"];
        fields.extend_from_slice(ENVELOPE_FIELDS);
        fields.extend_from_slice(specific);
        fields
    }

    /// List-valued fields whose items are objects, for per-item alias
    /// normalization during reconciliation.
    pub fn item_list_fields(&self) -> &'static [&'static str] {
        match self {
            Category::Workout => &["exercises"],
            Category::Recipe => &["ingredients", "steps"],
            Category::Travel => &["activities"],
            Category::Product => &["products"],
            Category::Educational => &["steps"],
            Category::Music => &[],
        }
    }

    /// Machine-readable schema descriptor for this category's strict
    /// record, as handed to the schema sanitizer.
    pub fn generation_schema(&self) -> JsonValue {
        match self {
            Category::Workout => schema_descriptor::<WorkoutRoutine>(),
            Category::Recipe => schema_descriptor::<RecipeCard>(),
            Category::Travel => schema_descriptor::<TravelItinerary>(),
            Category::Product => schema_descriptor::<ProductCatalog>(),
            Category::Educational => schema_descriptor::<TutorialSummary>(),
            Category::Music => schema_descriptor::<SongMetadata>(),
        }
    }

    /// Attempt strict construction of this category's record from a
    /// reconciled mapping.
    pub fn construct(&self, value: JsonValue) -> Result<ExtractionRecord, ValidationError> {
        Ok(match self {
            Category::Workout => ExtractionRecord::Workout(construct::<WorkoutRoutine>(value)?),
            Category::Recipe => ExtractionRecord::Recipe(construct::<RecipeCard>(value)?),
            Category::Travel => ExtractionRecord::Travel(construct::<TravelItinerary>(value)?),
            Category::Product => ExtractionRecord::Product(construct::<ProductCatalog>(value)?),
            Category::Educational => {
                ExtractionRecord::Tutorial(construct::<TutorialSummary>(value)?)
            }
            Category::Music => ExtractionRecord::Song(construct::<SongMetadata>(value)?),
        })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(&s.to_lowercase())
            .ok_or_else(|| crate::error::Error::InvalidInput(format!("unknown category: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Strict record contract
// ---------------------------------------------------------------------------

/// Contract every strict category record satisfies.
///
/// `FIELDS` and `REQUIRED` list the category-specific declared field
/// names; envelope fields are shared via [`ENVELOPE_FIELDS`].
pub trait RecordSchema: Serialize + DeserializeOwned + JsonSchema {
    const SCHEMA_NAME: &'static str;
    const CATEGORY: Category;
    const FIELDS: &'static [&'static str];
    const REQUIRED: &'static [&'static str];

    /// Append every out-of-range or constraint-violating field.
    fn validate(&self, issues: &mut Vec<FieldIssue>);
}

fn schema_descriptor<T: RecordSchema>() -> JsonValue {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(JsonValue::Null)
}

/// Construct a strict record: required-field presence first (all missing
/// fields reported together), then typed deserialization, then range
/// validation (all violations reported together).
fn construct<T: RecordSchema>(value: JsonValue) -> Result<T, ValidationError> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            return Err(ValidationError::new(
                T::SCHEMA_NAME,
                vec![FieldIssue::new("$", "response is not a JSON object")],
            ))
        }
    };

    let mut issues = Vec::new();
    for field in T::REQUIRED {
        match obj.get(*field) {
            None | Some(JsonValue::Null) => issues.push(FieldIssue::missing(*field)),
            _ => {}
        }
    }
    if !issues.is_empty() {
        return Err(ValidationError::new(T::SCHEMA_NAME, issues));
    }

    let record: T = serde_json::from_value(value)
        .map_err(|e| ValidationError::new(T::SCHEMA_NAME, vec![FieldIssue::mistyped(&e)]))?;

    record.validate(&mut issues);
    if issues.is_empty() {
        Ok(record)
    } else {
        Err(ValidationError::new(T::SCHEMA_NAME, issues))
    }
}

// ---------------------------------------------------------------------------
// Extraction record union
// ---------------------------------------------------------------------------

/// One analysis produces exactly one of these. The `Generic` variant is
/// the externally visible strict-vs-fallback distinction consumed by
/// persistence (`is_generic`).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExtractionRecord {
    Workout(WorkoutRoutine),
    Recipe(RecipeCard),
    Travel(TravelItinerary),
    Product(ProductCatalog),
    Tutorial(TutorialSummary),
    Song(SongMetadata),
    Generic(GenericExtraction),
}

impl ExtractionRecord {
    pub fn is_generic(&self) -> bool {
        matches!(self, ExtractionRecord::Generic(_))
    }

    fn envelope(&self) -> Option<&Envelope> {
        match self {
            ExtractionRecord::Workout(r) => Some(&r.envelope),
            ExtractionRecord::Recipe(r) => Some(&r.envelope),
            ExtractionRecord::Travel(r) => Some(&r.envelope),
            ExtractionRecord::Product(r) => Some(&r.envelope),
            ExtractionRecord::Tutorial(r) => Some(&r.envelope),
            ExtractionRecord::Song(r) => Some(&r.envelope),
            ExtractionRecord::Generic(_) => None,
        }
    }

    fn envelope_mut(&mut self) -> Option<&mut Envelope> {
        match self {
            ExtractionRecord::Workout(r) => Some(&mut r.envelope),
            ExtractionRecord::Recipe(r) => Some(&mut r.envelope),
            ExtractionRecord::Travel(r) => Some(&mut r.envelope),
            ExtractionRecord::Product(r) => Some(&mut r.envelope),
            ExtractionRecord::Tutorial(r) => Some(&mut r.envelope),
            ExtractionRecord::Song(r) => Some(&mut r.envelope),
            ExtractionRecord::Generic(_) => None,
        }
    }

    /// Category label. Free-form for generic records.
    pub fn category_label(&self) -> &str {
        match self {
            ExtractionRecord::Workout(_) => Category::Workout.as_str(),
            ExtractionRecord::Recipe(_) => Category::Recipe.as_str(),
            ExtractionRecord::Travel(_) => Category::Travel.as_str(),
            ExtractionRecord::Product(_) => Category::Product.as_str(),
            ExtractionRecord::Tutorial(_) => Category::Educational.as_str(),
            ExtractionRecord::Song(_) => Category::Music.as_str(),
            ExtractionRecord::Generic(r) => &r.category,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            ExtractionRecord::Generic(r) => r.title.as_deref(),
            _ => self.envelope().and_then(|e| e.title.as_deref()),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ExtractionRecord::Generic(r) => r.description.as_deref(),
            _ => self.envelope().and_then(|e| e.description.as_deref()),
        }
    }

    pub fn source_url(&self) -> Option<&str> {
        match self {
            ExtractionRecord::Generic(r) => r.source_url.as_deref(),
            _ => self.envelope().and_then(|e| e.source_url.as_deref()),
        }
    }

    pub fn extracted_at(&self) -> chrono::DateTime<chrono::Utc> {
        match self {
            ExtractionRecord::Generic(r) => r.extracted_at,
            _ => self
                .envelope()
                .map(|e| e.extracted_at)
                .unwrap_or_else(chrono::Utc::now),
        }
    }

    pub fn confidence_score(&self) -> f64 {
        match self {
            ExtractionRecord::Generic(r) => r.confidence_score,
            _ => self.envelope().map(|e| e.confidence_score).unwrap_or(0.0),
        }
    }

    pub fn keyframes(&self) -> &[String] {
        match self {
            ExtractionRecord::Generic(r) => &r.keyframes,
            _ => self
                .envelope()
                .map(|e| e.keyframes.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Backfill extracted keyframe paths once segmentation output is
    /// known. This is the only mutation permitted after construction;
    /// ingestion order (monotonic frame index) must be preserved by the
    /// caller.
    pub fn set_keyframes(&mut self, keyframes: Vec<String>) {
        match self {
            ExtractionRecord::Generic(r) => r.keyframes = keyframes,
            _ => {
                if let Some(envelope) = self.envelope_mut() {
                    envelope.keyframes = keyframes;
                }
            }
        }
    }

    /// Container tags for the memory store: category plus a refinement
    /// where the record carries one (difficulty, cuisine, genre).
    pub fn container_tags(&self) -> Vec<String> {
        let mut tags = vec![self.category_label().to_string()];
        match self {
            ExtractionRecord::Workout(r) => tags.push(r.difficulty_level.as_str().to_string()),
            ExtractionRecord::Recipe(r) => {
                if let Some(cuisine) = &r.cuisine_type {
                    tags.push(cuisine.to_lowercase());
                }
            }
            ExtractionRecord::Song(r) => {
                if let Some(genre) = &r.genre {
                    tags.push(genre.to_lowercase());
                }
            }
            ExtractionRecord::Product(_) => tags.push("shopping".to_string()),
            ExtractionRecord::Tutorial(_) => tags.push("tutorial".to_string()),
            _ => {}
        }
        tags
    }

    /// Full structured payload as a JSON value (the opaque content blob
    /// handed to persistence).
    pub fn to_value(&self) -> crate::error::Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_labels_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.as_str()), Some(cat));
        }
    }

    #[test]
    fn test_match_response_exact() {
        assert_eq!(Category::match_response("workout"), Some(Category::Workout));
        assert_eq!(Category::match_response(" Recipe \n"), Some(Category::Recipe));
    }

    #[test]
    fn test_match_response_substring() {
        assert_eq!(
            Category::match_response("This looks like a travel video."),
            Some(Category::Travel)
        );
    }

    #[test]
    fn test_match_response_no_label() {
        assert_eq!(Category::match_response("comedy sketch"), None);
    }

    #[test]
    fn test_declared_fields_include_envelope_and_specific() {
        let fields = Category::Workout.declared_fields();
        assert!(fields.contains(&"category"));
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"additional_context"));
        assert!(fields.contains(&"exercises"));
        assert!(!fields.contains(&"keyframes"));
    }

    #[test]
    fn test_construct_reports_all_missing_required() {
        let err = Category::Travel
            .construct(json!({"category": "travel"}))
            .unwrap_err();
        let fields: Vec<_> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"destination"));
        assert!(fields.contains(&"activities"));
    }

    #[test]
    fn test_construct_rejects_non_object() {
        let err = Category::Workout.construct(json!([1, 2])).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].field, "$");
    }

    #[test]
    fn test_record_category_label_is_fixed() {
        let record = Category::Workout
            .construct(json!({
                "category": "workout",
                "exercises": [{"name": "Squats", "reps": 15}],
            }))
            .unwrap();
        assert_eq!(record.category_label(), "workout");
        assert!(!record.is_generic());
    }

    #[test]
    fn test_set_keyframes_preserves_order() {
        let mut record = Category::Workout
            .construct(json!({
                "category": "workout",
                "exercises": [{"name": "Squats"}],
            }))
            .unwrap();
        let frames = vec!["f_0001.jpg".to_string(), "f_0002.jpg".to_string()];
        record.set_keyframes(frames.clone());
        assert_eq!(record.keyframes(), frames.as_slice());
    }

    #[test]
    fn test_container_tags_workout_difficulty() {
        let record = Category::Workout
            .construct(json!({
                "category": "workout",
                "exercises": [{"name": "Squats"}],
                "difficulty_level": "advanced",
            }))
            .unwrap();
        assert_eq!(record.container_tags(), vec!["workout", "advanced"]);
    }

    #[test]
    fn test_generation_schema_is_object() {
        for cat in Category::ALL {
            let schema = cat.generation_schema();
            assert!(schema.is_object(), "{cat} schema should be an object");
            assert!(schema.get("properties").is_some());
        }
    }
}
