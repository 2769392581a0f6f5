//! Structured logging field name constants for reelex.
//!
//! All crates use these constants for consistent structured logging
//! fields, so log aggregation tools can query by standardized names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Terminal stage failure, requires operator attention |
//! | WARN  | Recoverable issue, fallback or skip applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points (tier selection, reconciliation counts) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "inference", "extract", "memory", "pipeline"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "gemini", "reconciler", "fallback", "store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "detect_category", "extract", "store_extraction"
pub const OPERATION: &str = "op";

/// Task UUID for a pipeline run.
pub const TASK_ID: &str = "task_id";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Extraction category label.
pub const CATEGORY: &str = "category";

/// Pipeline stage name.
pub const STAGE: &str = "stage";

/// Keyframe index within a segmented video.
pub const FRAME_INDEX: &str = "frame_index";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Number of results returned by a search or upload batch.
pub const RESULT_COUNT: &str = "result_count";
