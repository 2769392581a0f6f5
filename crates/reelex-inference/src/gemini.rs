//! Gemini HTTP generation backend.
//!
//! Speaks the Generative Language `generateContent` API. Each tier owns
//! a ladder of model names tried in order of preference; a model that
//! is unknown to the endpoint is skipped, a quota signal surfaces as
//! [`Error::QuotaExhausted`] so the orchestrator can downgrade tiers.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use reelex_core::defaults::{ENV_GEMINI_API_KEY, ENV_GEN_TIMEOUT_SECS, GEN_TIMEOUT_SECS};
use reelex_core::{Error, Result};

use crate::backend::{
    GenerateRequest, GenerateResponse, GenerationBackend, ModelTier,
};

/// Quality-first model ladder: best quality first, cheaper fallbacks after.
const QUALITY_MODELS: &[&str] = &[
    "models/gemini-2.5-pro",
    "models/gemini-2.5-flash",
    "models/gemini-2.0-flash-001",
    "models/gemini-2.0-flash",
];

/// Fast-only ladder: skips Pro, whose free-tier rate limit is tighter.
const FAST_MODELS: &[&str] = &[
    "models/gemini-2.5-flash",
    "models/gemini-2.0-flash-001",
    "models/gemini-2.0-flash",
];

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini generation backend.
pub struct GeminiBackend {
    base_url: String,
    api_key: String,
    client: Client,
    timeout_secs: u64,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            client: Client::new(),
            timeout_secs: GEN_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables. `GEMINI_API_KEY` is required;
    /// `GEMINI_BASE_URL` and `REELEX_GEN_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ENV_GEMINI_API_KEY)
            .map_err(|_| Error::Config(format!("{ENV_GEMINI_API_KEY} is required")))?;
        let mut backend = Self::new(api_key);
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            backend.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(timeout) = std::env::var(ENV_GEN_TIMEOUT_SECS) {
            if let Ok(secs) = timeout.parse() {
                backend.timeout_secs = secs;
            }
        }
        Ok(backend)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn models_for(tier: ModelTier) -> &'static [&'static str] {
        match tier {
            ModelTier::Quality => QUALITY_MODELS,
            ModelTier::Fast => FAST_MODELS,
        }
    }

    fn build_body(request: &GenerateRequest) -> GeminiRequestBody {
        let mut parts = vec![GeminiPart::text(request.prompt.clone())];
        for media in &request.media {
            parts.push(GeminiPart::inline(
                media.mime_type.clone(),
                base64::engine::general_purpose::STANDARD.encode(&media.data),
            ));
        }
        if let Some(transcript) = &request.transcript {
            parts.push(GeminiPart::text(format!("\nAudio Transcript:\n{transcript}")));
        }

        let generation_config = request.response_schema.as_ref().map(|schema| {
            GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Some(schema.clone()),
            }
        });

        GeminiRequestBody {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            generation_config,
        }
    }

    /// One attempt against a single model. `Ok(None)` means the model is
    /// unknown to the endpoint and the ladder should advance.
    async fn try_model(
        &self,
        model: &str,
        body: &GeminiRequestBody,
    ) -> Result<Option<GenerateResponse>> {
        let url = format!("{}/{}:generateContent", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(model, "Model not available, advancing ladder");
            return Ok(None);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body_text = response.text().await.unwrap_or_default();
            return Err(Error::QuotaExhausted(format!("{model}: {body_text}")));
        }
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            if body_text.contains("RESOURCE_EXHAUSTED") {
                return Err(Error::QuotaExhausted(format!("{model}: {body_text}")));
            }
            return Err(Error::Inference(format!(
                "Gemini returned {status}: {body_text}"
            )));
        }

        let parsed: GeminiResponseBody = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| Error::Inference("Gemini returned no candidates".to_string()))?;

        Ok(Some(GenerateResponse {
            text,
            model: model.to_string(),
        }))
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let start = Instant::now();
        let body = Self::build_body(request);
        let models = Self::models_for(request.tier);

        for model in models {
            match self.try_model(model, &body).await? {
                Some(response) => {
                    debug!(
                        model,
                        tier = %request.tier,
                        response_len = response.text.len(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Generation complete"
                    );
                    return Ok(response);
                }
                None => continue,
            }
        }

        warn!(tier = %request.tier, "No model in ladder was available");
        Err(Error::Inference(format!(
            "no available model for tier {} (tried: {})",
            request.tier,
            models.join(", ")
        )))
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;
        Ok(matches!(response, Ok(r) if r.status().is_success()))
    }

    fn backend_name(&self) -> &str {
        "gemini"
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GeminiRequestBody {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

impl GeminiPart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline(mime_type: String, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(GeminiInlineData { mime_type, data }),
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseBody {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}
