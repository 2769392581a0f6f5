//! Tracing subscriber setup for pipeline hosts.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// Environment variables:
///   LOG_FORMAT - "json" or "text" (default: "text")
///   RUST_LOG   - standard env filter (default: "reelex=debug")
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "reelex=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .ok();
    }
}
