//! Recipe/cooking video extraction records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::validation::{check_min_f64, check_min_u32, FieldIssue};
use super::{Category, RecordSchema};

/// A single ingredient with its display quantity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Ingredient {
    pub name: String,
    /// Quantity with unit as displayed, e.g. "2 cups", "200g".
    pub quantity: String,
    pub notes: Option<String>,
}

/// A single step in a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecipeStep {
    pub step_number: u32,
    pub instruction: String,
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub utensils: Vec<String>,
}

/// Complete recipe extracted from a cooking video reel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecipeCard {
    pub category: Category,
    #[serde(flatten)]
    pub envelope: Envelope,
    pub ingredients: Option<Vec<Ingredient>>,
    pub steps: Option<Vec<RecipeStep>>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub servings: Option<u32>,
    /// e.g. "Italian", "Asian", "Mexican".
    pub cuisine_type: Option<String>,
}

impl RecordSchema for RecipeCard {
    const SCHEMA_NAME: &'static str = "RecipeCard";
    const CATEGORY: Category = Category::Recipe;
    const FIELDS: &'static [&'static str] = &[
        "ingredients",
        "steps",
        "prep_time_minutes",
        "cook_time_minutes",
        "servings",
        "cuisine_type",
    ];
    const REQUIRED: &'static [&'static str] = &[];

    fn validate(&self, issues: &mut Vec<FieldIssue>) {
        self.envelope.validate(issues);
        if self.category != Self::CATEGORY {
            issues.push(FieldIssue::new("category", "must be \"recipe\""));
        }
        if let Some(steps) = &self.steps {
            for (i, step) in steps.iter().enumerate() {
                if step.step_number < 1 {
                    issues.push(FieldIssue::out_of_range(
                        format!("steps[{i}].step_number"),
                        format!("{} < 1", step.step_number),
                    ));
                }
                check_min_f64(
                    issues,
                    &format!("steps[{i}].duration_minutes"),
                    step.duration_minutes,
                    0.0,
                );
            }
        }
        check_min_u32(issues, "servings", self.servings, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipe_with_no_optional_sections_constructs() {
        let card = super::super::construct::<RecipeCard>(json!({
            "category": "recipe",
            "title": "Chocolate Chip Cookies",
        }))
        .unwrap();
        assert!(card.ingredients.is_none());
        assert!(card.steps.is_none());
    }

    #[test]
    fn test_full_recipe_constructs() {
        let card = super::super::construct::<RecipeCard>(json!({
            "category": "recipe",
            "title": "Chocolate Chip Cookies",
            "ingredients": [
                {"name": "Flour", "quantity": "2 cups"},
                {"name": "Butter", "quantity": "1 cup", "notes": "softened"},
            ],
            "steps": [
                {"step_number": 1, "instruction": "Mix dry ingredients", "utensils": ["bowl"]},
                {"step_number": 2, "instruction": "Add wet ingredients"},
            ],
            "prep_time_minutes": 15,
            "cook_time_minutes": 12,
            "servings": 24,
            "cuisine_type": "American",
        }))
        .unwrap();
        assert_eq!(card.ingredients.as_ref().unwrap().len(), 2);
        assert_eq!(card.steps.as_ref().unwrap()[0].utensils, vec!["bowl"]);
    }

    #[test]
    fn test_zero_step_number_is_rejected() {
        let err = super::super::construct::<RecipeCard>(json!({
            "category": "recipe",
            "steps": [{"step_number": 0, "instruction": "Preheat"}],
        }))
        .unwrap_err();
        assert!(err.issues.iter().any(|i| i.field == "steps[0].step_number"));
    }

    #[test]
    fn test_zero_servings_is_rejected() {
        let err = super::super::construct::<RecipeCard>(json!({
            "category": "recipe",
            "servings": 0,
        }))
        .unwrap_err();
        assert!(err.issues.iter().any(|i| i.field == "servings"));
    }
}
