//! Pipeline driver: download → segment → analyze → store.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};
use uuid::Uuid;

use reelex_core::{Category, ExtractionRecord, Result};
use reelex_extract::{AnalysisMedia, Extractor};
use reelex_inference::MediaPart;
use reelex_memory::{MemoryStore, StoreReceipt, TaskPatch, TaskRegistry, TaskState, TaskStatus};

use crate::collaborators::{
    SegmentOptions, Segmenter, SourceType, TranscriptOutcome, VideoSource,
};

// ---------------------------------------------------------------------------
// Stages and report
// ---------------------------------------------------------------------------

/// Pipeline stages, used to tag errors and progress notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Segment,
    Analyze,
    Store,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Download => "downloading",
            Stage::Segment => "segmenting",
            Stage::Analyze => "analyzing",
            Stage::Store => "storing",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage-tagged error or warning.
#[derive(Debug, Clone)]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)
    }
}

/// How the run ended, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Record extracted strictly and stored, no warnings.
    Success,
    /// Data extracted, but with fallback or non-fatal sub-errors.
    PartialSuccess,
    /// No usable record; see the error list.
    Failure,
}

/// Structured result of one analysis run.
#[derive(Debug)]
pub struct PipelineReport {
    pub record: Option<ExtractionRecord>,
    pub stored: bool,
    pub receipt: Option<StoreReceipt>,
    pub thumbnail_path: Option<PathBuf>,
    pub temp_files: Vec<PathBuf>,
    pub warnings: Vec<StageError>,
    pub errors: Vec<StageError>,
}

impl PipelineReport {
    fn new() -> Self {
        Self {
            record: None,
            stored: false,
            receipt: None,
            thumbnail_path: None,
            temp_files: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn outcome(&self) -> PipelineOutcome {
        match &self.record {
            None => PipelineOutcome::Failure,
            Some(record) => {
                if record.is_generic() || !self.stored || !self.warnings.is_empty() {
                    PipelineOutcome::PartialSuccess
                } else {
                    PipelineOutcome::Success
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Stage/progress notifications for external callers. Implementations
/// must not fail the pipeline; swallow and log internally.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn notify(&self, stage: &str, progress: u8);
}

/// Mirrors progress into a task registry entry.
pub struct RegistryProgress {
    task_id: Uuid,
    registry: Arc<dyn TaskRegistry>,
}

impl RegistryProgress {
    pub fn new(task_id: Uuid, registry: Arc<dyn TaskRegistry>) -> Self {
        Self { task_id, registry }
    }
}

#[async_trait]
impl ProgressSink for RegistryProgress {
    async fn notify(&self, stage: &str, progress: u8) {
        if let Err(err) = self
            .registry
            .update(self.task_id, TaskPatch::stage(stage, progress))
            .await
        {
            warn!(task_id = %self.task_id, error = %err, "Progress update dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Inputs for one analysis run.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub input: String,
    pub source_type: SourceType,
    /// When absent, the category is detected with one classification call.
    pub preferred_category: Option<Category>,
    pub options: SegmentOptions,
}

impl ExtractRequest {
    pub fn url(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            source_type: SourceType::Url,
            preferred_category: None,
            options: SegmentOptions::default(),
        }
    }

    pub fn file(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            source_type: SourceType::File,
            preferred_category: None,
            options: SegmentOptions::default(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.preferred_category = Some(category);
        self
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Coordinates the collaborators for end-to-end reel extraction.
///
/// Each run is a single request-scoped task: category is resolved once,
/// exactly one extractor runs, and no state is shared between
/// concurrent runs beyond the injected store handles.
pub struct ReelPipeline {
    source: Arc<dyn VideoSource>,
    segmenter: Arc<dyn Segmenter>,
    extractor: Extractor,
    store: Arc<dyn MemoryStore>,
}

impl ReelPipeline {
    pub fn new(
        source: Arc<dyn VideoSource>,
        segmenter: Arc<dyn Segmenter>,
        extractor: Extractor,
        store: Arc<dyn MemoryStore>,
    ) -> Self {
        Self {
            source,
            segmenter,
            extractor,
            store,
        }
    }

    /// Run one analysis end to end. Hard failures are reported inside
    /// the returned report, never as an `Err`.
    pub async fn run(
        &self,
        request: &ExtractRequest,
        progress: Option<&dyn ProgressSink>,
    ) -> PipelineReport {
        let mut report = PipelineReport::new();

        // Stage 1: acquire the video.
        notify(progress, Stage::Download.as_str(), 10).await;
        let video_path = match self.source.fetch(&request.input, request.source_type).await {
            Ok(path) => path,
            Err(err) => {
                error!(stage = %Stage::Download, error = %err, "Pipeline aborted");
                report.errors.push(StageError {
                    stage: Stage::Download,
                    message: err.to_string(),
                });
                notify(progress, "error", 100).await;
                return report;
            }
        };
        report.temp_files.push(video_path.clone());
        notify(progress, Stage::Download.as_str(), 30).await;

        // Stage 2: segment into keyframes/audio/transcript.
        notify(progress, Stage::Segment.as_str(), 40).await;
        let segmentation = match self.segmenter.segment(&video_path, &request.options).await {
            Ok(segmentation) => segmentation,
            Err(err) => {
                error!(stage = %Stage::Segment, error = %err, "Pipeline aborted");
                report.errors.push(StageError {
                    stage: Stage::Segment,
                    message: err.to_string(),
                });
                notify(progress, "error", 100).await;
                return report;
            }
        };
        for warning in &segmentation.warnings {
            report.warnings.push(StageError {
                stage: Stage::Segment,
                message: warning.clone(),
            });
        }
        if let TranscriptOutcome::Absent { reason } = &segmentation.transcript {
            report.warnings.push(StageError {
                stage: Stage::Segment,
                message: format!("transcript unavailable: {reason}"),
            });
        }
        if let Some(audio) = &segmentation.audio_path {
            report.temp_files.push(audio.clone());
        }
        report.temp_files.extend(segmentation.keyframes.clone());
        report.thumbnail_path = segmentation.keyframes.first().cloned();
        notify(progress, Stage::Segment.as_str(), 60).await;

        // Stage 3: analyze.
        notify(progress, Stage::Analyze.as_str(), 70).await;
        let media = self.build_media(&video_path, &segmentation, &mut report);
        let mut record = match self
            .extractor
            .analyze(&media, request.preferred_category)
            .await
        {
            Ok(record) => record,
            Err(err) => {
                error!(stage = %Stage::Analyze, error = %err, "Pipeline aborted");
                report.errors.push(StageError {
                    stage: Stage::Analyze,
                    message: err.to_string(),
                });
                notify(progress, "error", 100).await;
                return report;
            }
        };
        // Backfill keyframe paths in ingestion order (the two-phase write).
        record.set_keyframes(
            segmentation
                .keyframes
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        );
        notify(progress, Stage::Analyze.as_str(), 85).await;

        // Stage 4: persist. Failure here degrades to partial success.
        notify(progress, Stage::Store.as_str(), 90).await;
        let source_url = match request.source_type {
            SourceType::Url => Some(request.input.as_str()),
            SourceType::File => None,
        };
        match self.store.store_extraction(&record, source_url).await {
            Ok(receipt) => {
                report.stored = true;
                report.receipt = Some(receipt);
            }
            Err(err) => {
                warn!(stage = %Stage::Store, error = %err, "Record extracted but not stored");
                report.warnings.push(StageError {
                    stage: Stage::Store,
                    message: err.to_string(),
                });
            }
        }

        info!(
            category = record.category_label(),
            is_generic = record.is_generic(),
            stored = report.stored,
            "Analysis complete"
        );
        report.record = Some(record);
        notify(progress, "done", 100).await;
        report
    }

    /// Run one analysis while mirroring progress into a task registry.
    pub async fn run_tracked(
        &self,
        task_id: Uuid,
        registry: Arc<dyn TaskRegistry>,
        request: &ExtractRequest,
    ) -> Result<PipelineReport> {
        registry.put(task_id, TaskState::queued()).await?;
        registry
            .update(
                task_id,
                TaskPatch {
                    status: Some(TaskStatus::Processing),
                    ..Default::default()
                },
            )
            .await?;

        let sink = RegistryProgress::new(task_id, registry.clone());
        let report = self.run(request, Some(&sink)).await;

        let patch = match report.outcome() {
            PipelineOutcome::Failure => TaskPatch {
                status: Some(TaskStatus::Failed),
                error: Some(
                    report
                        .errors
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                ),
                ..TaskPatch::stage("error", 100)
            },
            _ => TaskPatch {
                status: Some(TaskStatus::Completed),
                reel_id: report.receipt.as_ref().map(|r| r.custom_id.clone()),
                ..TaskPatch::stage("done", 100)
            },
        };
        registry.update(task_id, patch).await?;
        Ok(report)
    }

    /// Assemble analysis media from the segmentation output. Unreadable
    /// files are skipped with a warning; analysis can proceed on
    /// whatever media survives.
    fn build_media(
        &self,
        video_path: &std::path::Path,
        segmentation: &crate::collaborators::Segmentation,
        report: &mut PipelineReport,
    ) -> AnalysisMedia {
        let mut media = AnalysisMedia {
            video: None,
            keyframes: Vec::new(),
            transcript: segmentation.transcript.text().map(str::to_string),
        };

        match std::fs::read(video_path) {
            Ok(data) => {
                let mime = infer_mime(video_path, &data);
                media.video = Some(MediaPart::video(mime, data));
            }
            Err(err) => {
                warn!(path = %video_path.display(), error = %err, "Video unreadable, analyzing without it");
                report.warnings.push(StageError {
                    stage: Stage::Analyze,
                    message: format!("video unreadable: {err}"),
                });
            }
        }

        for path in &segmentation.keyframes {
            match MediaPart::keyframe_from_path(path) {
                Ok(part) => media.keyframes.push(part),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Skipping unreadable keyframe");
                    report.warnings.push(StageError {
                        stage: Stage::Analyze,
                        message: format!("keyframe unreadable: {}", path.display()),
                    });
                }
            }
        }
        media
    }
}

async fn notify(progress: Option<&dyn ProgressSink>, stage: &str, pct: u8) {
    if let Some(sink) = progress {
        sink.notify(stage, pct).await;
    }
}

fn infer_mime(path: &std::path::Path, data: &[u8]) -> String {
    infer::get(data)
        .map(|t| t.mime_type().to_string())
        .unwrap_or_else(|| {
            if path.extension().and_then(|e| e.to_str()) == Some("webm") {
                "video/webm".to_string()
            } else {
                "video/mp4".to_string()
            }
        })
}
