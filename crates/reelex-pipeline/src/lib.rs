//! # reelex-pipeline
//!
//! The multi-stage pipeline caller: download → segment → analyze →
//! store, with stage-tagged errors and a structured report that
//! distinguishes success from partial success from hard failure.
//!
//! Video download and FFmpeg segmentation are external collaborators
//! behind the [`VideoSource`] and [`Segmenter`] traits; this crate only
//! drives them.

pub mod collaborators;
pub mod config;
pub mod pipeline;
pub mod telemetry;

pub use collaborators::{
    SegmentOptions, Segmentation, Segmenter, SourceType, TranscriptOutcome, VideoSource,
};
pub use config::AppConfig;
pub use pipeline::{
    ExtractRequest, PipelineOutcome, PipelineReport, ProgressSink, ReelPipeline,
    RegistryProgress, Stage, StageError,
};
