//! Category extraction orchestrator.
//!
//! Drives the per-category pipeline: build prompt → call model →
//! unwrap/parse → reconcile → strict construction → generic fallback on
//! validation failure. Parse and transport failures are terminal for
//! the analysis; fallback applies to schema mismatch only.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use reelex_core::defaults::{DETECT_KEYFRAME_LIMIT, EXTRACT_KEYFRAME_LIMIT};
use reelex_core::{Category, Error, ExtractionRecord, Result};
use reelex_inference::{
    parse_json_response, GenerateRequest, GenerateResponse, GenerationBackend, MediaPart,
    ModelTier,
};

use crate::fallback::{build_generic, wrap_top_level_array};
use crate::prompts::{detection_prompt, extraction_prompt};
use crate::reconcile::reconcile;
use crate::sanitize::sanitize_schema;

/// Media handed to one analysis call: optional full video, ordered
/// keyframes, optional audio transcript.
#[derive(Debug, Clone, Default)]
pub struct AnalysisMedia {
    pub video: Option<MediaPart>,
    pub keyframes: Vec<MediaPart>,
    pub transcript: Option<String>,
}

impl AnalysisMedia {
    /// Assemble request media: video first, then up to `limit`
    /// keyframes in ingestion order.
    fn parts(&self, limit: usize) -> Vec<MediaPart> {
        let mut parts = Vec::new();
        if let Some(video) = &self.video {
            parts.push(video.clone());
        }
        parts.extend(self.keyframes.iter().take(limit).cloned());
        parts
    }
}

/// Orchestrates detection and per-category structured extraction
/// against an injected generation backend.
pub struct Extractor {
    backend: Arc<dyn GenerationBackend>,
}

impl Extractor {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// One generation call with the only retry policy in the system:
    /// on a quota signal, retry once on the downgraded tier.
    async fn generate_with_downgrade(
        &self,
        mut request: GenerateRequest,
    ) -> Result<GenerateResponse> {
        match self.backend.generate(&request).await {
            Err(err) if err.is_quota() => match request.tier.downgrade() {
                Some(tier) => {
                    warn!(
                        from = %request.tier,
                        to = %tier,
                        "Quota exhausted, retrying once on lower tier"
                    );
                    request.tier = tier;
                    self.backend.generate(&request).await
                }
                None => Err(err),
            },
            other => other,
        }
    }

    /// Single-shot category classification over the closed label set.
    /// No exact or substring match is a terminal detection error.
    pub async fn detect_category(&self, media: &AnalysisMedia) -> Result<Category> {
        let request = GenerateRequest {
            prompt: detection_prompt(),
            media: media.parts(DETECT_KEYFRAME_LIMIT),
            transcript: media.transcript.clone(),
            response_schema: None,
            tier: ModelTier::Quality,
        };
        let response = self.generate_with_downgrade(request).await?;
        let category = Category::match_response(&response.text).ok_or_else(|| {
            Error::Detection(format!(
                "could not determine category, response: {:?}",
                response.text.trim()
            ))
        })?;
        info!(category = %category, model = %response.model, "Category detected");
        Ok(category)
    }

    /// Run the full extraction pipeline for one known category.
    pub async fn extract(
        &self,
        category: Category,
        media: &AnalysisMedia,
    ) -> Result<ExtractionRecord> {
        let start = Instant::now();
        let schema = sanitize_schema(&category.generation_schema());
        let request = GenerateRequest {
            prompt: extraction_prompt(category).to_string(),
            media: media.parts(EXTRACT_KEYFRAME_LIMIT),
            transcript: media.transcript.clone(),
            response_schema: Some(schema),
            tier: ModelTier::Quality,
        };

        let response = self.generate_with_downgrade(request).await?;
        debug!(
            category = %category,
            model = %response.model,
            response_len = response.text.len(),
            "Response received"
        );

        // Parse failure is terminal: transport-shaped, not schema-shaped.
        let parsed = wrap_top_level_array(parse_json_response(&response.text)?);

        let candidate = match parsed.as_object() {
            Some(obj) => JsonValue::Object(reconcile(category, obj)),
            // Scalar responses skip reconciliation; strict construction
            // rejects them and the fallback path decides their fate.
            None => parsed.clone(),
        };

        let record = match category.construct(candidate.clone()) {
            Ok(record) => {
                info!(
                    category = %category,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Strict extraction validated"
                );
                record
            }
            Err(validation_error) => {
                warn!(
                    category = %category,
                    error = %validation_error,
                    "Strict construction failed, building generic fallback"
                );
                let context = candidate
                    .get("additional_context")
                    .and_then(|v| v.as_object())
                    .cloned();
                let generic = build_generic(category, &parsed, context)?;
                ExtractionRecord::Generic(generic)
            }
        };
        Ok(record)
    }

    /// Analyze one video: resolve the category (detecting it when no
    /// hint is supplied), then run exactly one extractor.
    pub async fn analyze(
        &self,
        media: &AnalysisMedia,
        preferred_category: Option<Category>,
    ) -> Result<ExtractionRecord> {
        let category = match preferred_category {
            Some(category) => category,
            None => self.detect_category(media).await?,
        };
        self.extract(category, media).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelex_inference::mock::MockGenerationBackend;

    fn extractor(backend: &MockGenerationBackend) -> Extractor {
        Extractor::new(Arc::new(backend.clone()))
    }

    #[tokio::test]
    async fn test_detect_category_exact_label() {
        let backend = MockGenerationBackend::new().with_fixed_response("workout");
        let category = extractor(&backend)
            .detect_category(&AnalysisMedia::default())
            .await
            .unwrap();
        assert_eq!(category, Category::Workout);
    }

    #[tokio::test]
    async fn test_detect_category_substring_match() {
        let backend =
            MockGenerationBackend::new().with_fixed_response("This is clearly a recipe video.");
        let category = extractor(&backend)
            .detect_category(&AnalysisMedia::default())
            .await
            .unwrap();
        assert_eq!(category, Category::Recipe);
    }

    #[tokio::test]
    async fn test_detect_category_unknown_label_is_terminal() {
        let backend = MockGenerationBackend::new().with_fixed_response("a cat video");
        let err = extractor(&backend)
            .detect_category(&AnalysisMedia::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Detection(_)));
        // Exactly one call: detection is never retried.
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_quota_downgrades_once_then_succeeds() {
        let backend = MockGenerationBackend::new().with_fixed_response("workout");
        backend.push_quota_error("429");
        let category = extractor(&backend)
            .detect_category(&AnalysisMedia::default())
            .await
            .unwrap();
        assert_eq!(category, Category::Workout);

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tier, ModelTier::Quality);
        assert_eq!(calls[1].tier, ModelTier::Fast);
    }

    #[tokio::test]
    async fn test_quota_on_fast_tier_is_not_retried_again() {
        let backend = MockGenerationBackend::new();
        backend.push_quota_error("429");
        backend.push_quota_error("429 again");
        let err = extractor(&backend)
            .detect_category(&AnalysisMedia::default())
            .await
            .unwrap_err();
        assert!(err.is_quota());
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_non_quota_failure_is_not_retried() {
        let backend = MockGenerationBackend::new();
        backend.push_failure("500");
        let err = extractor(&backend)
            .detect_category(&AnalysisMedia::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_extract_sends_sanitized_schema() {
        let backend = MockGenerationBackend::new()
            .with_fixed_response(r#"{"exercises": [{"name": "Squats"}]}"#);
        extractor(&backend)
            .extract(Category::Workout, &AnalysisMedia::default())
            .await
            .unwrap();
        let schema = backend.calls()[0].schema.clone().unwrap();
        let text = schema.to_string();
        assert!(!text.contains("$ref"));
        assert!(!text.contains("$defs"));
    }

    #[tokio::test]
    async fn test_extract_strict_success() {
        let backend = MockGenerationBackend::new().with_fixed_response(
            r#"{"title": "Leg Day", "exercises": [{"name": "Squats", "reps": 12}]}"#,
        );
        let record = extractor(&backend)
            .extract(Category::Workout, &AnalysisMedia::default())
            .await
            .unwrap();
        assert!(!record.is_generic());
        assert_eq!(record.title(), Some("Leg Day"));
    }

    #[tokio::test]
    async fn test_extract_parse_error_is_terminal_not_fallback() {
        let backend = MockGenerationBackend::new().with_fixed_response("not json at all");
        let err = extractor(&backend)
            .extract(Category::Workout, &AnalysisMedia::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_extract_schema_mismatch_falls_back() {
        let backend = MockGenerationBackend::new()
            .with_fixed_response(r#"{"title": "Mystery", "stuff": [1, 2, 3]}"#);
        let record = extractor(&backend)
            .extract(Category::Workout, &AnalysisMedia::default())
            .await
            .unwrap();
        assert!(record.is_generic());
        assert_eq!(record.category_label(), "workout");
    }
}
