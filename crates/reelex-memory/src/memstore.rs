//! In-memory store implementation for deterministic tests.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Mutex;

use reelex_core::{ExtractionRecord, Result};

use crate::store::{
    custom_id_for, metadata_for, KeyframeUploadReport, MemoryStore, SearchHit, SearchResults,
    StoreReceipt,
};

/// One stored document, as tests want to inspect it.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub content: JsonValue,
    pub container_tag: String,
    pub metadata: serde_json::Map<String, JsonValue>,
    pub custom_id: String,
}

/// Memory store backed by a vector; search is naive substring match
/// over serialized content.
#[derive(Default)]
pub struct InMemoryStore {
    documents: Mutex<Vec<StoredDocument>>,
    fail_next: Mutex<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with the given message.
    pub fn fail_next_store(&self, reason: impl Into<String>) {
        *self.fail_next.lock().unwrap() = Some(reason.into());
    }

    pub fn documents(&self) -> Vec<StoredDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn store_extraction(
        &self,
        record: &ExtractionRecord,
        source_url: Option<&str>,
    ) -> Result<StoreReceipt> {
        if let Some(reason) = self.fail_next.lock().unwrap().take() {
            return Err(reelex_core::Error::Storage(reason));
        }

        let mut payload_record = record.clone();
        payload_record.set_keyframes(Vec::new());
        let content = payload_record.to_value()?;
        let content_text = serde_json::to_string(&content)?;
        let custom_id = custom_id_for(source_url.or_else(|| record.source_url()), &content_text);
        let metadata = metadata_for(record, source_url, &custom_id);

        let document = StoredDocument {
            content,
            container_tag: record.category_label().to_string(),
            metadata,
            custom_id: custom_id.clone(),
        };
        let document_id = format!("doc_{}", self.len());
        self.documents.lock().unwrap().push(document);

        Ok(StoreReceipt {
            document_id: Some(document_id),
            custom_id,
            keyframes: KeyframeUploadReport::default(),
        })
    }

    async fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        let needle = query.to_lowercase();
        let results = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.content.to_string().to_lowercase().contains(&needle))
            .take(if limit == 0 { usize::MAX } else { limit })
            .map(|(i, doc)| SearchHit {
                id: Some(format!("doc_{i}")),
                score: Some(1.0),
                content: Some(doc.content.clone()),
                metadata: Some(JsonValue::Object(doc.metadata.clone())),
                extra: serde_json::Map::new(),
            })
            .collect();
        Ok(SearchResults { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workout_record() -> ExtractionRecord {
        reelex_core::Category::Workout
            .construct(json!({
                "category": "workout",
                "title": "Leg Day",
                "exercises": [{"name": "Squats"}],
            }))
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_and_search() {
        let store = InMemoryStore::new();
        let receipt = store
            .store_extraction(&workout_record(), Some("https://example.com/r/1"))
            .await
            .unwrap();
        assert!(receipt.document_id.is_some());

        let hits = store.search("squats", 10).await.unwrap();
        assert_eq!(hits.results.len(), 1);
        let misses = store.search("ceviche", 10).await.unwrap();
        assert!(misses.results.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryStore::new();
        store.fail_next_store("backend down");
        let err = store
            .store_extraction(&workout_record(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("backend down"));
        assert!(store.is_empty());
    }
}
