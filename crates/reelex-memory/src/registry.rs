//! Task registry: progress/result state for in-flight analyses.
//!
//! The registry is an explicitly passed store handle with a small
//! `put`/`get`/`update` surface, so pipeline callers stay testable
//! without a process-wide singleton. The in-memory implementation is
//! suitable for a single-process deployment only: not crash-safe, not
//! multi-process-safe.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use reelex_core::{Error, Result};

/// Lifecycle status of one analysis task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Mutable state tracked per task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskState {
    pub status: TaskStatus,
    /// 0–100.
    pub progress: u8,
    /// Stage label: queued | downloading | segmenting | analyzing |
    /// storing | done | error.
    pub stage: String,
    pub reel_id: Option<String>,
    pub error: Option<String>,
}

impl TaskState {
    pub fn queued() -> Self {
        Self {
            status: TaskStatus::Queued,
            progress: 0,
            stage: "queued".to_string(),
            reel_id: None,
            error: None,
        }
    }
}

/// Partial update applied to an existing task.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
    pub stage: Option<String>,
    pub reel_id: Option<String>,
    pub error: Option<String>,
}

impl TaskPatch {
    pub fn stage(stage: impl Into<String>, progress: u8) -> Self {
        Self {
            stage: Some(stage.into()),
            progress: Some(progress),
            ..Default::default()
        }
    }
}

/// Store handle for task state.
#[async_trait]
pub trait TaskRegistry: Send + Sync {
    async fn put(&self, id: Uuid, state: TaskState) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<TaskState>;
    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<()>;
}

/// Process-local registry backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryTaskRegistry {
    tasks: RwLock<HashMap<Uuid, TaskState>>,
}

impl InMemoryTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRegistry for InMemoryTaskRegistry {
    async fn put(&self, id: Uuid, state: TaskState) -> Result<()> {
        self.tasks.write().await.insert(id, state);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<TaskState> {
        self.tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::TaskNotFound(id))
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        let state = tasks.get_mut(&id).ok_or(Error::TaskNotFound(id))?;
        if let Some(status) = patch.status {
            state.status = status;
        }
        if let Some(progress) = patch.progress {
            state.progress = progress.min(100);
        }
        if let Some(stage) = patch.stage {
            state.stage = stage;
        }
        if let Some(reel_id) = patch.reel_id {
            state.reel_id = Some(reel_id);
        }
        if let Some(error) = patch.error {
            state.error = Some(error);
        }
        Ok(())
    }
}
