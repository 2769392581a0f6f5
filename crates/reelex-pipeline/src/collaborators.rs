//! External collaborator seams: video acquisition and segmentation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use reelex_core::Result;

/// What kind of input reference the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    File,
    Url,
}

/// Resolves an input reference (local path or URL) to a local video
/// file ready for segmentation and analysis.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch(&self, input: &str, source_type: SourceType) -> Result<PathBuf>;
}

/// Options for one segmentation run.
#[derive(Debug, Clone)]
pub struct SegmentOptions {
    pub extract_keyframes: bool,
    pub extract_audio: bool,
    pub transcribe: bool,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            extract_keyframes: true,
            extract_audio: true,
            transcribe: true,
        }
    }
}

/// Transcription outcome, explicit so callers can tell "absent with a
/// reason" apart from "never attempted".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    Available(String),
    Absent { reason: String },
    NotAttempted,
}

impl TranscriptOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            TranscriptOutcome::Available(text) => Some(text),
            _ => None,
        }
    }
}

/// Segmentation output. Keyframes preserve ingestion order (monotonic
/// frame index).
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub keyframes: Vec<PathBuf>,
    pub audio_path: Option<PathBuf>,
    pub transcript: TranscriptOutcome,
    /// Non-fatal sub-errors (e.g. audio track missing).
    pub warnings: Vec<String>,
}

/// Splits a video into keyframes and audio, optionally transcribing.
#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn segment(&self, video: &Path, options: &SegmentOptions) -> Result<Segmentation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_outcome_text() {
        assert_eq!(
            TranscriptOutcome::Available("hi".to_string()).text(),
            Some("hi")
        );
        assert_eq!(
            TranscriptOutcome::Absent {
                reason: "no audio track".to_string()
            }
            .text(),
            None
        );
        assert_eq!(TranscriptOutcome::NotAttempted.text(), None);
    }
}
