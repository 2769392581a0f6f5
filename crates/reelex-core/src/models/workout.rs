//! Workout video extraction records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::envelope::Envelope;
use super::validation::{check_min_u32, check_non_empty, check_range_u32, FieldIssue};
use super::{Category, RecordSchema};

/// Difficulty tiers a routine can be tagged with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// A single exercise in a workout routine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Exercise {
    pub name: String,
    /// Number of sets (>= 1 when present).
    pub sets: Option<u32>,
    /// Repetitions per set (>= 1 when present).
    pub reps: Option<u32>,
    /// Duration for time-based exercises (>= 1 when present).
    pub duration_seconds: Option<u32>,
    /// Rest after this exercise.
    pub rest_seconds: Option<u32>,
}

impl Exercise {
    fn validate(&self, index: usize, issues: &mut Vec<FieldIssue>) {
        let prefix = format!("exercises[{index}]");
        if self.name.trim().is_empty() {
            issues.push(FieldIssue::new(format!("{prefix}.name"), "must not be empty"));
        }
        check_min_u32(issues, &format!("{prefix}.sets"), self.sets, 1);
        check_min_u32(issues, &format!("{prefix}.reps"), self.reps, 1);
        check_min_u32(
            issues,
            &format!("{prefix}.duration_seconds"),
            self.duration_seconds,
            1,
        );
    }
}

/// Complete workout routine extracted from a video reel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkoutRoutine {
    pub category: Category,
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Ordered, non-empty exercise list.
    pub exercises: Vec<Exercise>,
    pub total_rounds: Option<u32>,
    pub estimated_duration_minutes: Option<f64>,
    #[serde(default)]
    pub difficulty_level: Difficulty,
    /// Music tempo if detected, 60–200 BPM.
    pub music_tempo_bpm: Option<u32>,
}

impl RecordSchema for WorkoutRoutine {
    const SCHEMA_NAME: &'static str = "WorkoutRoutine";
    const CATEGORY: Category = Category::Workout;
    const FIELDS: &'static [&'static str] = &[
        "exercises",
        "total_rounds",
        "estimated_duration_minutes",
        "difficulty_level",
        "music_tempo_bpm",
    ];
    const REQUIRED: &'static [&'static str] = &["exercises"];

    fn validate(&self, issues: &mut Vec<FieldIssue>) {
        self.envelope.validate(issues);
        if self.category != Self::CATEGORY {
            issues.push(FieldIssue::new("category", "must be \"workout\""));
        }
        check_non_empty(issues, "exercises", &self.exercises);
        for (i, exercise) in self.exercises.iter().enumerate() {
            exercise.validate(i, issues);
        }
        check_min_u32(issues, "total_rounds", self.total_rounds, 1);
        super::validation::check_min_f64(
            issues,
            "estimated_duration_minutes",
            self.estimated_duration_minutes,
            0.0,
        );
        check_range_u32(issues, "music_tempo_bpm", self.music_tempo_bpm, 60, 200);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_workout() -> serde_json::Value {
        json!({
            "category": "workout",
            "title": "HIIT Cardio Blast",
            "description": "20-minute high-intensity workout",
            "confidence_score": 0.9,
            "exercises": [
                {"name": "Squats", "sets": 3, "reps": 15, "rest_seconds": 15},
                {"name": "Burpees", "duration_seconds": 30, "rest_seconds": 15},
            ],
            "total_rounds": 3,
            "estimated_duration_minutes": 20.0,
            "difficulty_level": "intermediate",
        })
    }

    #[test]
    fn test_valid_workout_constructs() {
        let routine = super::super::construct::<WorkoutRoutine>(valid_workout()).unwrap();
        assert_eq!(routine.exercises.len(), 2);
        assert_eq!(routine.difficulty_level, Difficulty::Intermediate);
        assert_eq!(routine.envelope.title.as_deref(), Some("HIIT Cardio Blast"));
    }

    #[test]
    fn test_missing_exercises_is_reported() {
        let err = super::super::construct::<WorkoutRoutine>(json!({"category": "workout"}))
            .unwrap_err();
        assert_eq!(err.schema, "WorkoutRoutine");
        assert_eq!(err.issues[0].field, "exercises");
    }

    #[test]
    fn test_empty_exercise_list_is_rejected() {
        let mut value = valid_workout();
        value["exercises"] = json!([]);
        let err = super::super::construct::<WorkoutRoutine>(value).unwrap_err();
        assert!(err.issues.iter().any(|i| i.field == "exercises"));
    }

    #[test]
    fn test_bpm_out_of_range_enumerated_with_other_issues() {
        let mut value = valid_workout();
        value["music_tempo_bpm"] = json!(250);
        value["confidence_score"] = json!(2.0);
        let err = super::super::construct::<WorkoutRoutine>(value).unwrap_err();
        let fields: Vec<_> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"music_tempo_bpm"));
        assert!(fields.contains(&"confidence_score"));
    }

    #[test]
    fn test_difficulty_defaults_to_intermediate() {
        let mut value = valid_workout();
        value.as_object_mut().unwrap().remove("difficulty_level");
        let routine = super::super::construct::<WorkoutRoutine>(value).unwrap();
        assert_eq!(routine.difficulty_level, Difficulty::Intermediate);
    }
}
