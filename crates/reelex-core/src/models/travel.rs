//! Travel/itinerary video extraction records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::envelope::Envelope;
use super::validation::{check_min_f64, check_non_empty, FieldIssue};
use super::{Category, RecordSchema};

/// A single activity or place to visit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Activity {
    pub name: String,
    pub location: String,
    pub google_maps_link: Option<String>,
    pub booking_link: Option<String>,
    pub estimated_duration_hours: Option<f64>,
}

/// Travel itinerary extracted from a travel video reel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TravelItinerary {
    pub category: Category,
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Main destination or location.
    pub destination: String,
    /// Ordered, non-empty activity list.
    pub activities: Vec<Activity>,
    /// Day-by-day breakdown, shape left to the model.
    pub day_breakdown: Option<Vec<JsonValue>>,
    /// e.g. "$500-800".
    pub estimated_budget: Option<String>,
}

impl RecordSchema for TravelItinerary {
    const SCHEMA_NAME: &'static str = "TravelItinerary";
    const CATEGORY: Category = Category::Travel;
    const FIELDS: &'static [&'static str] = &[
        "destination",
        "activities",
        "day_breakdown",
        "estimated_budget",
    ];
    const REQUIRED: &'static [&'static str] = &["destination", "activities"];

    fn validate(&self, issues: &mut Vec<FieldIssue>) {
        self.envelope.validate(issues);
        if self.category != Self::CATEGORY {
            issues.push(FieldIssue::new("category", "must be \"travel\""));
        }
        if self.destination.trim().is_empty() {
            issues.push(FieldIssue::new("destination", "must not be empty"));
        }
        check_non_empty(issues, "activities", &self.activities);
        for (i, activity) in self.activities.iter().enumerate() {
            check_min_f64(
                issues,
                &format!("activities[{i}].estimated_duration_hours"),
                activity.estimated_duration_hours,
                0.0,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_itinerary_constructs() {
        let itinerary = super::super::construct::<TravelItinerary>(json!({
            "category": "travel",
            "title": "3 Days in Paris",
            "destination": "Paris, France",
            "activities": [
                {"name": "Louvre Museum", "location": "Paris, France", "estimated_duration_hours": 3.0},
                {"name": "Eiffel Tower", "location": "Paris, France"},
            ],
            "day_breakdown": [
                {"day": 1, "activities": ["Louvre Museum", "Seine River Cruise"]},
            ],
            "estimated_budget": "$500-800",
        }))
        .unwrap();
        assert_eq!(itinerary.activities.len(), 2);
        assert_eq!(itinerary.destination, "Paris, France");
    }

    #[test]
    fn test_missing_destination_and_activities_both_reported() {
        let err =
            super::super::construct::<TravelItinerary>(json!({"category": "travel"})).unwrap_err();
        let fields: Vec<_> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["destination", "activities"]);
    }

    #[test]
    fn test_empty_activity_list_is_rejected() {
        let err = super::super::construct::<TravelItinerary>(json!({
            "category": "travel",
            "destination": "Lyon",
            "activities": [],
        }))
        .unwrap_err();
        assert!(err.issues.iter().any(|i| i.field == "activities"));
    }
}
