//! Centralized default constants for the reelex system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of
//! defining their own magic numbers.
//!
//! Several of these are data-quality patches inherited from observed
//! model behavior rather than product requirements (noted per constant);
//! they are centralized here so a config surface can override them
//! without hunting through call sites.

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Maximum characters kept from the first line of a free-text item name.
/// Data-quality guard against verbose model output, not a correctness rule.
pub const NAME_MAX_CHARS: usize = 50;

/// Default estimated duration applied when a workout response omits it.
pub const WORKOUT_DEFAULT_DURATION_MINUTES: f64 = 20.0;

/// Default difficulty applied when a workout response omits it.
pub const WORKOUT_DEFAULT_DIFFICULTY: &str = "intermediate";

// =============================================================================
// FALLBACK
// =============================================================================

/// Confidence score assigned to generic fallback records, reflecting
/// reduced trust relative to the strict path.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Provenance key naming the strict schema that was attempted.
pub const ORIGINAL_CATEGORY_KEY: &str = "_original_category";

/// Provenance key holding the diagnostic string for why fallback ran.
pub const FALLBACK_REASON_KEY: &str = "_fallback_reason";

// =============================================================================
// GENERATION
// =============================================================================

/// Keyframes attached to a category detection call.
pub const DETECT_KEYFRAME_LIMIT: usize = 5;

/// Keyframes attached to a structured extraction call.
pub const EXTRACT_KEYFRAME_LIMIT: usize = 10;

/// Ceiling on a single generation-backend call, in seconds.
/// Overridable via `REELEX_GEN_TIMEOUT_SECS`.
pub const GEN_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Ceiling on a single storage/search call, in seconds.
pub const STORAGE_TIMEOUT_SECS: u64 = 30;

/// Prefix for the content-derived custom id linking sibling assets.
pub const CUSTOM_ID_PREFIX: &str = "extraction_";

/// Hex characters of the source-url digest kept in the custom id.
pub const CUSTOM_ID_HASH_LEN: usize = 12;

/// Upload every Nth keyframe (stride 2 keeps frames 0, 2, 4, ...).
pub const KEYFRAME_UPLOAD_STRIDE: usize = 2;

/// Default search result limit.
pub const SEARCH_LIMIT: usize = 10;

// =============================================================================
// PIPELINE
// =============================================================================

/// Maximum accepted video size in megabytes.
pub const MAX_VIDEO_SIZE_MB: u64 = 500;

/// Seconds between extracted keyframes.
pub const KEYFRAME_INTERVAL_SECONDS: u64 = 3;

/// Maximum accepted video duration in minutes.
pub const MAX_VIDEO_DURATION_MINUTES: u64 = 5;

/// Hours after which temp artifacts are eligible for cleanup.
pub const CLEANUP_AFTER_HOURS: u64 = 24;

/// Default temp storage directory.
pub const TEMP_STORAGE_PATH: &str = "./temp_storage";

// =============================================================================
// ENVIRONMENT VARIABLE NAMES
// =============================================================================

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MEMORY_API_KEY: &str = "MEMORY_API_KEY";
pub const ENV_MEMORY_BASE_URL: &str = "MEMORY_BASE_URL";
pub const ENV_GEN_TIMEOUT_SECS: &str = "REELEX_GEN_TIMEOUT_SECS";
pub const ENV_STORAGE_TIMEOUT_SECS: &str = "REELEX_STORAGE_TIMEOUT_SECS";
pub const ENV_TEMP_STORAGE_PATH: &str = "TEMP_STORAGE_PATH";
pub const ENV_KEYFRAME_INTERVAL_SECONDS: &str = "KEYFRAME_INTERVAL_SECONDS";
pub const ENV_MAX_VIDEO_DURATION_MINUTES: &str = "MAX_VIDEO_DURATION_MINUTES";
pub const ENV_MAX_VIDEO_SIZE_MB: &str = "MAX_VIDEO_SIZE_MB";
