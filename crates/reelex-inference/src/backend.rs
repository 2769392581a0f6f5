//! Generation backend trait and request/response types.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use reelex_core::Result;

// ---------------------------------------------------------------------------
// Model tiers
// ---------------------------------------------------------------------------

/// Backend variant selection.
///
/// Quality is attempted first; on a quota/rate-limit signal the caller
/// retries once with Fast, which has a more generous rate limit. This
/// is the only retry policy in the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelTier {
    #[default]
    Quality,
    Fast,
}

impl ModelTier {
    /// The tier to downgrade to after a quota signal, if any.
    pub fn downgrade(&self) -> Option<ModelTier> {
        match self {
            ModelTier::Quality => Some(ModelTier::Fast),
            ModelTier::Fast => None,
        }
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Quality => write!(f, "quality"),
            ModelTier::Fast => write!(f, "fast"),
        }
    }
}

// ---------------------------------------------------------------------------
// Multimodal request parts
// ---------------------------------------------------------------------------

/// What a media part represents, for keyframe-limit bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Keyframe,
}

/// One binary attachment in a multimodal request.
#[derive(Clone)]
pub struct MediaPart {
    pub kind: MediaKind,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl MediaPart {
    pub fn video(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            kind: MediaKind::Video,
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn keyframe(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            kind: MediaKind::Keyframe,
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a keyframe image from disk, detecting its MIME type from
    /// magic bytes (extension as fallback).
    pub fn keyframe_from_path(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mime_type = infer::get(&data)
            .map(|t| t.mime_type().to_string())
            .unwrap_or_else(|| mime_from_extension(path));
        Ok(Self::keyframe(mime_type, data))
    }
}

impl std::fmt::Debug for MediaPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPart")
            .field("kind", &self.kind)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

pub(crate) fn mime_from_extension(path: &std::path::Path) -> String {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png".to_string(),
        Some("webp") => "image/webp".to_string(),
        Some("mp4") => "video/mp4".to_string(),
        _ => "image/jpeg".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A single multi-part generation request. The backend concatenates
/// prompt text, media parts, and the transcript into one call.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    pub media: Vec<MediaPart>,
    pub transcript: Option<String>,
    /// Sanitized schema descriptor. When set, the backend is asked for
    /// JSON-shaped output constrained to this schema.
    pub response_schema: Option<JsonValue>,
    pub tier: ModelTier,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Generation backend output.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub text: String,
    /// Model that actually served the request.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Backend for multimodal generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one generation call.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Backend identifier for logging.
    fn backend_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_downgrade_chain() {
        assert_eq!(ModelTier::Quality.downgrade(), Some(ModelTier::Fast));
        assert_eq!(ModelTier::Fast.downgrade(), None);
    }

    #[test]
    fn test_mime_from_extension() {
        use std::path::Path;
        assert_eq!(mime_from_extension(Path::new("frame_0001.png")), "image/png");
        assert_eq!(mime_from_extension(Path::new("frame_0001.jpg")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_from_extension(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn test_media_part_debug_hides_bytes() {
        let part = MediaPart::keyframe("image/jpeg", vec![0u8; 1024]);
        let debug = format!("{part:?}");
        assert!(debug.contains("1024"));
        assert!(!debug.contains("[0,"));
    }
}
