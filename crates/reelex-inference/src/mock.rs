//! Mock generation backend for deterministic testing.
//!
//! Responses can be queued one-shot (consumed in order), mapped by
//! prompt substring, or defaulted. Every call is logged so tests can
//! assert on what the orchestrator actually sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use reelex_core::{Error, Result};

use crate::backend::{GenerateRequest, GenerateResponse, GenerationBackend, ModelTier};

/// One recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub tier: ModelTier,
    pub media_count: usize,
    pub schema: Option<serde_json::Value>,
    pub transcript: Option<String>,
}

impl MockCall {
    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }
}

#[derive(Debug, Clone)]
enum Queued {
    Text(String),
    Quota(String),
    Failure(String),
}

#[derive(Debug)]
struct MockConfig {
    default_response: String,
    mapped: Vec<(String, String)>,
    queued: VecDeque<Queued>,
    latency_ms: u64,
    failure_rate: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_response: "{}".to_string(),
            mapped: Vec::new(),
            queued: VecDeque::new(),
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

/// Mock generation backend.
#[derive(Clone, Default)]
pub struct MockGenerationBackend {
    config: Arc<Mutex<MockConfig>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response returned when nothing queued or mapped matches.
    pub fn with_fixed_response(self, response: impl Into<String>) -> Self {
        self.config.lock().unwrap().default_response = response.into();
        self
    }

    /// Respond with `output` whenever the prompt contains `needle`.
    pub fn with_response_mapping(
        self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.config
            .lock()
            .unwrap()
            .mapped
            .push((needle.into(), output.into()));
        self
    }

    /// Add artificial latency to every call.
    pub fn with_latency_ms(self, latency_ms: u64) -> Self {
        self.config.lock().unwrap().latency_ms = latency_ms;
        self
    }

    /// Fail calls randomly at the given rate (0.0–1.0).
    pub fn with_failure_rate(self, rate: f64) -> Self {
        self.config.lock().unwrap().failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Queue a one-shot response consumed before mappings and defaults.
    pub fn push_response(&self, text: impl Into<String>) {
        self.config
            .lock()
            .unwrap()
            .queued
            .push_back(Queued::Text(text.into()));
    }

    /// Queue a one-shot quota error (triggers tier downgrade upstream).
    pub fn push_quota_error(&self, message: impl Into<String>) {
        self.config
            .lock()
            .unwrap()
            .queued
            .push_back(Queued::Quota(message.into()));
    }

    /// Queue a one-shot hard inference failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.config
            .lock()
            .unwrap()
            .queued
            .push_back(Queued::Failure(message.into()));
    }

    /// All recorded calls so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let (latency_ms, failure_rate, queued, mapped_response) = {
            let mut config = self.config.lock().unwrap();
            let queued = config.queued.pop_front();
            let mapped = config
                .mapped
                .iter()
                .find(|(needle, _)| request.prompt.contains(needle))
                .map(|(_, output)| output.clone());
            (
                config.latency_ms,
                config.failure_rate,
                queued,
                mapped.unwrap_or_else(|| config.default_response.clone()),
            )
        };

        self.call_log.lock().unwrap().push(MockCall {
            prompt: request.prompt.clone(),
            tier: request.tier,
            media_count: request.media.len(),
            schema: request.response_schema.clone(),
            transcript: request.transcript.clone(),
        });

        if latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(latency_ms)).await;
        }
        if failure_rate > 0.0 && rand::random::<f64>() < failure_rate {
            return Err(Error::Inference("mock: injected failure".to_string()));
        }

        let text = match queued {
            Some(Queued::Quota(message)) => return Err(Error::QuotaExhausted(message)),
            Some(Queued::Failure(message)) => return Err(Error::Inference(message)),
            Some(Queued::Text(text)) => text,
            None => mapped_response,
        };

        Ok(GenerateResponse {
            text,
            model: "mock".to_string(),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
