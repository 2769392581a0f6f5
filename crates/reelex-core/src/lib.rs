//! # reelex-core
//!
//! Core types, traits, and abstractions for the reelex extraction engine.
//!
//! This crate provides the category record registry (the six strict
//! extraction shapes plus the generic fallback record), the shared error
//! type, and the default constants that other reelex crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
