//! # reelex-memory
//!
//! Document-store client for extraction records (opaque content blob
//! plus flat scalar metadata, similarity search, keyframe asset upload)
//! and the injected task registry used by pipeline callers.

#[cfg(any(test, feature = "mock"))]
pub mod memstore;
pub mod registry;
pub mod store;

pub use registry::{InMemoryTaskRegistry, TaskPatch, TaskRegistry, TaskState, TaskStatus};
pub use store::{
    HttpMemoryStore, KeyframeUploadReport, MemoryStore, SearchHit, SearchResults, SkippedKeyframe,
    StoreReceipt,
};
