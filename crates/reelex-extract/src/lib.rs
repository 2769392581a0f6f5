//! # reelex-extract
//!
//! The schema-flexible extraction and fallback-reconciliation engine.
//!
//! Raw model output flows one way through this crate:
//! reconciled candidate → validated strict record, or a lossless
//! generic fallback when strict construction fails. No stage mutates a
//! prior stage's output after handoff.

pub mod fallback;
pub mod orchestrator;
pub mod prompts;
pub mod reconcile;
pub mod sanitize;

pub use fallback::{build_generic, wrap_top_level_array};
pub use orchestrator::{AnalysisMedia, Extractor};
pub use reconcile::reconcile;
pub use sanitize::sanitize_schema;
