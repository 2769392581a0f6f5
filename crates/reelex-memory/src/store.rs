//! Memory store trait and the HTTP document-store client.
//!
//! The store is a black-box key-value document service with
//! search-by-similarity. A record serializes to a single opaque content
//! blob plus a flat metadata map of scalars used for later filtering;
//! sibling keyframe images are linked through a content-derived custom
//! id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, warn};

use reelex_core::defaults::{
    CUSTOM_ID_HASH_LEN, CUSTOM_ID_PREFIX, ENV_MEMORY_API_KEY, ENV_MEMORY_BASE_URL,
    ENV_STORAGE_TIMEOUT_SECS, KEYFRAME_UPLOAD_STRIDE, SEARCH_LIMIT, STORAGE_TIMEOUT_SECS,
};
use reelex_core::{Error, ExtractionRecord, Result};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A keyframe that failed to upload. Skips are non-fatal and reported
/// explicitly so callers can distinguish "absent" from "never attempted".
#[derive(Debug, Clone)]
pub struct SkippedKeyframe {
    pub frame_index: usize,
    pub path: String,
    pub reason: String,
}

/// Outcome of the keyframe upload pass.
#[derive(Debug, Clone, Default)]
pub struct KeyframeUploadReport {
    pub uploaded: usize,
    pub skipped: Vec<SkippedKeyframe>,
}

/// Outcome of storing one extraction record.
#[derive(Debug, Clone)]
pub struct StoreReceipt {
    /// Identifier assigned by the store, when it returns one.
    pub document_id: Option<String>,
    /// Content-derived stable identifier linking sibling image assets.
    pub custom_id: String,
    pub keyframes: KeyframeUploadReport,
}

/// One similarity-search hit. The store's payload shape is not ours to
/// pin down, so unknown fields are carried along.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default, alias = "documentId")]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub content: Option<JsonValue>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Persistence seam for extraction records.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store one record plus its keyframe assets.
    async fn store_extraction(
        &self,
        record: &ExtractionRecord,
        source_url: Option<&str>,
    ) -> Result<StoreReceipt>;

    /// Similarity search over stored memories.
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults>;
}

/// Content-derived stable identifier: a short digest of the source URL
/// (or of the content blob when no URL exists).
pub fn custom_id_for(source_url: Option<&str>, content: &str) -> String {
    let digest = match source_url {
        Some(url) => md5::compute(url.as_bytes()),
        None => md5::compute(content.as_bytes()),
    };
    let hex = format!("{digest:x}");
    format!("{CUSTOM_ID_PREFIX}{}", &hex[..CUSTOM_ID_HASH_LEN])
}

/// Flat scalar metadata map stored alongside the content blob.
pub fn metadata_for(
    record: &ExtractionRecord,
    source_url: Option<&str>,
    custom_id: &str,
) -> Map<String, JsonValue> {
    let mut metadata = Map::new();
    let topic = record
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| record.category_label().to_string());
    metadata.insert("topic".to_string(), JsonValue::String(topic));
    metadata.insert(
        "category".to_string(),
        JsonValue::String(record.category_label().to_string()),
    );
    if let Some(url) = source_url.or_else(|| record.source_url()) {
        metadata.insert("source_url".to_string(), JsonValue::String(url.to_string()));
    }
    metadata.insert(
        "extracted_at".to_string(),
        JsonValue::String(record.extracted_at().to_rfc3339()),
    );
    metadata.insert(
        "confidence_score".to_string(),
        JsonValue::from(record.confidence_score()),
    );
    metadata.insert("is_generic".to_string(), JsonValue::Bool(record.is_generic()));
    metadata.insert(
        "customId".to_string(),
        JsonValue::String(custom_id.to_string()),
    );
    metadata
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Client for the hosted document store.
pub struct HttpMemoryStore {
    base_url: String,
    api_key: String,
    client: Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct StoreDocumentRequest {
    content: String,
    container_tag: String,
    metadata: Map<String, JsonValue>,
}

#[derive(Deserialize)]
struct StoreDocumentResponse {
    #[serde(default, alias = "documentId")]
    id: Option<String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    limit: usize,
}

impl HttpMemoryStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
            timeout_secs: STORAGE_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables. `MEMORY_API_KEY` is required;
    /// `MEMORY_BASE_URL` and `REELEX_STORAGE_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ENV_MEMORY_API_KEY)
            .map_err(|_| Error::Config(format!("{ENV_MEMORY_API_KEY} is required")))?;
        let base_url = std::env::var(ENV_MEMORY_BASE_URL)
            .unwrap_or_else(|_| "https://api.supermemory.ai".to_string());
        let mut store = Self::new(base_url, api_key);
        if let Ok(timeout) = std::env::var(ENV_STORAGE_TIMEOUT_SECS) {
            if let Ok(secs) = timeout.parse() {
                store.timeout_secs = secs;
            }
        }
        Ok(store)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Upload every Nth keyframe as an image document linked to the main
    /// record through the custom id. Individual failures are skipped
    /// and reported, never fatal.
    async fn upload_keyframes(
        &self,
        record: &ExtractionRecord,
        source_url: Option<&str>,
        custom_id: &str,
    ) -> KeyframeUploadReport {
        let mut report = KeyframeUploadReport::default();

        for (frame_index, path) in record.keyframes().iter().enumerate() {
            if frame_index % KEYFRAME_UPLOAD_STRIDE != 0 {
                continue;
            }
            match self
                .upload_one_keyframe(record, source_url, custom_id, frame_index, path)
                .await
            {
                Ok(()) => report.uploaded += 1,
                Err(err) => {
                    warn!(
                        frame_index,
                        path, error = %err,
                        "Skipping keyframe that failed to upload"
                    );
                    report.skipped.push(SkippedKeyframe {
                        frame_index,
                        path: path.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if report.uploaded > 0 {
            info!(
                result_count = report.uploaded,
                skipped = report.skipped.len(),
                "Stored keyframes"
            );
        }
        report
    }

    async fn upload_one_keyframe(
        &self,
        record: &ExtractionRecord,
        source_url: Option<&str>,
        custom_id: &str,
        frame_index: usize,
        path: &str,
    ) -> Result<()> {
        let data = std::fs::read(path)?;
        let mime_type = infer::get(&data)
            .map(|t| t.mime_type().to_string())
            .unwrap_or_else(|| mime_from_path(path));

        let mut kf_metadata = Map::new();
        let topic = record
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| record.category_label().to_string());
        kf_metadata.insert("topic".to_string(), JsonValue::String(topic));
        kf_metadata.insert(
            "category".to_string(),
            JsonValue::String(record.category_label().to_string()),
        );
        kf_metadata.insert("frame_index".to_string(), JsonValue::from(frame_index));
        if let Some(url) = source_url.or_else(|| record.source_url()) {
            kf_metadata.insert("source_url".to_string(), JsonValue::String(url.to_string()));
        }
        kf_metadata.insert(
            "extracted_at".to_string(),
            JsonValue::String(record.extracted_at().to_rfc3339()),
        );
        kf_metadata.insert(
            "customId".to_string(),
            JsonValue::String(custom_id.to_string()),
        );

        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("keyframe_{frame_index}.jpg"));

        let file_part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|e| Error::Storage(format!("invalid keyframe mime type: {e}")))?;

        let container_tags = serde_json::to_string(&record.container_tags())?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("container_tag", container_tags)
            .text("fileType", "image")
            .text("mimeType", mime_type)
            .text("metadata", serde_json::to_string(&kf_metadata)?);

        let url = format!("{}/v3/documents/file", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout())
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("keyframe upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "keyframe upload returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

fn mime_from_path(path: &str) -> String {
    let lower = path.to_lowercase();
    if lower.ends_with(".png") {
        "image/png".to_string()
    } else if lower.ends_with(".webp") {
        "image/webp".to_string()
    } else {
        "image/jpeg".to_string()
    }
}

#[async_trait]
impl MemoryStore for HttpMemoryStore {
    async fn store_extraction(
        &self,
        record: &ExtractionRecord,
        source_url: Option<&str>,
    ) -> Result<StoreReceipt> {
        // Keyframes travel as separate image documents, not inside the
        // content blob.
        let mut payload_record = record.clone();
        payload_record.set_keyframes(Vec::new());
        let content = serde_json::to_string(&payload_record.to_value()?)?;

        let custom_id = custom_id_for(source_url.or_else(|| record.source_url()), &content);
        let metadata = metadata_for(record, source_url, &custom_id);
        let container_tag = record.category_label().to_string();

        debug!(
            category = container_tag,
            custom_id, "Storing extraction record"
        );

        let request = StoreDocumentRequest {
            content,
            container_tag,
            metadata,
        };
        let url = format!("{}/v3/documents", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("store request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!("store returned {status}: {body}")));
        }

        let stored: StoreDocumentResponse = response
            .json()
            .await
            .map_err(|e| Error::Storage(format!("store response unreadable: {e}")))?;

        let keyframes = self.upload_keyframes(record, source_url, &custom_id).await;

        Ok(StoreReceipt {
            document_id: stored.id,
            custom_id,
            keyframes,
        })
    }

    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        let limit = if limit == 0 { SEARCH_LIMIT } else { limit };
        let url = format!("{}/v3/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout())
            .json(&SearchRequest { q: query, limit })
            .send()
            .await
            .map_err(|e| Error::Storage(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!("search returned {status}: {body}")));
        }

        let results: SearchResults = response
            .json()
            .await
            .map_err(|e| Error::Storage(format!("search response unreadable: {e}")))?;
        debug!(result_count = results.results.len(), "Search complete");
        Ok(results)
    }
}
