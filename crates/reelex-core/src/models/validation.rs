//! Structured validation failures for strict record construction.

/// One field-level problem found during strict construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field name, or `$` for a problem with the value as a whole.
    pub field: String,
    /// Human-readable description of the problem.
    pub problem: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "required field is missing")
    }

    pub fn mistyped(err: &serde_json::Error) -> Self {
        Self::new("$", format!("type mismatch: {err}"))
    }

    pub fn out_of_range(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(field, format!("out of range: {}", detail.into()))
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Descriptive construction failure enumerating every offending field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Name of the strict schema that was attempted.
    pub schema: &'static str,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(schema: &'static str, issues: Vec<FieldIssue>) -> Self {
        Self { schema, issues }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation failed: ", self.schema)?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// Range-check helpers shared by the record validators.

pub(crate) fn check_min_u32(
    issues: &mut Vec<FieldIssue>,
    field: &str,
    value: Option<u32>,
    min: u32,
) {
    if let Some(v) = value {
        if v < min {
            issues.push(FieldIssue::out_of_range(field, format!("{v} < {min}")));
        }
    }
}

pub(crate) fn check_range_u32(
    issues: &mut Vec<FieldIssue>,
    field: &str,
    value: Option<u32>,
    min: u32,
    max: u32,
) {
    if let Some(v) = value {
        if v < min || v > max {
            issues.push(FieldIssue::out_of_range(
                field,
                format!("{v} outside [{min}, {max}]"),
            ));
        }
    }
}

pub(crate) fn check_min_f64(
    issues: &mut Vec<FieldIssue>,
    field: &str,
    value: Option<f64>,
    min: f64,
) {
    if let Some(v) = value {
        if v < min {
            issues.push(FieldIssue::out_of_range(field, format!("{v} < {min}")));
        }
    }
}

pub(crate) fn check_non_empty<T>(issues: &mut Vec<FieldIssue>, field: &str, list: &[T]) {
    if list.is_empty() {
        issues.push(FieldIssue::new(field, "list must not be empty"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_enumerates_every_issue() {
        let err = ValidationError::new(
            "WorkoutRoutine",
            vec![
                FieldIssue::missing("exercises"),
                FieldIssue::out_of_range("confidence_score", "1.5 outside [0, 1]"),
            ],
        );
        let text = err.to_string();
        assert!(text.contains("WorkoutRoutine"));
        assert!(text.contains("exercises: required field is missing"));
        assert!(text.contains("confidence_score"));
    }

    #[test]
    fn test_check_min_u32_flags_zero() {
        let mut issues = Vec::new();
        check_min_u32(&mut issues, "sets", Some(0), 1);
        check_min_u32(&mut issues, "reps", Some(3), 1);
        check_min_u32(&mut issues, "rounds", None, 1);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "sets");
    }

    #[test]
    fn test_check_range_u32_bounds_inclusive() {
        let mut issues = Vec::new();
        check_range_u32(&mut issues, "bpm", Some(60), 60, 200);
        check_range_u32(&mut issues, "bpm", Some(200), 60, 200);
        assert!(issues.is_empty());
        check_range_u32(&mut issues, "bpm", Some(201), 60, 200);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_check_non_empty() {
        let mut issues = Vec::new();
        check_non_empty::<u8>(&mut issues, "activities", &[]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "activities");
    }
}
