//! Educational/how-to video extraction records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::validation::{check_min_u32, FieldIssue};
use super::{Category, RecordSchema};

/// A single step in a tutorial or how-to guide.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TutorialStep {
    pub step_number: u32,
    pub description: String,
    #[serde(default)]
    pub tools_required: Vec<String>,
    #[serde(default)]
    pub resource_links: Vec<String>,
}

/// Tutorial summary extracted from an educational video reel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TutorialSummary {
    pub category: Category,
    #[serde(flatten)]
    pub envelope: Envelope,
    pub topic: Option<String>,
    pub steps: Option<Vec<TutorialStep>>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub estimated_time_minutes: Option<u32>,
}

impl RecordSchema for TutorialSummary {
    const SCHEMA_NAME: &'static str = "TutorialSummary";
    const CATEGORY: Category = Category::Educational;
    const FIELDS: &'static [&'static str] = &[
        "topic",
        "steps",
        "prerequisites",
        "estimated_time_minutes",
    ];
    const REQUIRED: &'static [&'static str] = &[];

    fn validate(&self, issues: &mut Vec<FieldIssue>) {
        self.envelope.validate(issues);
        if self.category != Self::CATEGORY {
            issues.push(FieldIssue::new("category", "must be \"educational\""));
        }
        if let Some(steps) = &self.steps {
            for (i, step) in steps.iter().enumerate() {
                check_min_u32(
                    issues,
                    &format!("steps[{i}].step_number"),
                    Some(step.step_number),
                    1,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tutorial_constructs() {
        let tutorial = super::super::construct::<TutorialSummary>(json!({
            "category": "educational",
            "title": "Animated Graphics in Canva",
            "topic": "Graphic Design",
            "steps": [
                {"step_number": 1, "description": "Open Canva", "tools_required": ["Canva"]},
                {"step_number": 2, "description": "Import your asset"},
            ],
            "prerequisites": ["Basic Canva knowledge"],
            "estimated_time_minutes": 15,
        }))
        .unwrap();
        assert_eq!(tutorial.steps.as_ref().unwrap().len(), 2);
        assert_eq!(tutorial.prerequisites.len(), 1);
    }

    #[test]
    fn test_zero_step_number_is_rejected() {
        let err = super::super::construct::<TutorialSummary>(json!({
            "category": "educational",
            "steps": [{"step_number": 0, "description": "Open Canva"}],
        }))
        .unwrap_err();
        assert!(err.issues.iter().any(|i| i.field == "steps[0].step_number"));
    }
}
