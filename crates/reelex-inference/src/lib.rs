//! # reelex-inference
//!
//! Generation backend abstraction for reelex: the multimodal
//! [`GenerationBackend`] trait, the Gemini HTTP backend with its
//! quality/fast model tiers, response-text unwrapping, and a mock
//! backend for deterministic tests.

pub mod backend;
pub mod gemini;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod response;

pub use backend::{
    GenerateRequest, GenerateResponse, GenerationBackend, MediaKind, MediaPart, ModelTier,
};
pub use gemini::GeminiBackend;
pub use response::parse_json_response;
