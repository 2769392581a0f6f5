//! Application configuration from environment variables.

use std::path::PathBuf;

use tracing::debug;

use reelex_core::defaults::{
    self, ENV_GEMINI_API_KEY, ENV_GEN_TIMEOUT_SECS, ENV_KEYFRAME_INTERVAL_SECONDS,
    ENV_MAX_VIDEO_DURATION_MINUTES, ENV_MAX_VIDEO_SIZE_MB, ENV_MEMORY_API_KEY,
    ENV_MEMORY_BASE_URL, ENV_STORAGE_TIMEOUT_SECS, ENV_TEMP_STORAGE_PATH,
};
use reelex_core::{Error, Result};

/// Process-wide configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub memory_api_key: String,
    pub memory_base_url: String,
    pub gen_timeout_secs: u64,
    pub storage_timeout_secs: u64,
    pub temp_storage_path: PathBuf,
    pub keyframe_interval_seconds: u64,
    pub max_video_duration_minutes: u64,
    pub max_video_size_mb: u64,
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load from the environment, reading a `.env` file if present.
    /// Keys may be empty here; call [`AppConfig::validate`] before use.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let config = Self {
            gemini_api_key: std::env::var(ENV_GEMINI_API_KEY).unwrap_or_default(),
            memory_api_key: std::env::var(ENV_MEMORY_API_KEY).unwrap_or_default(),
            memory_base_url: std::env::var(ENV_MEMORY_BASE_URL)
                .unwrap_or_else(|_| "https://api.supermemory.ai".to_string()),
            gen_timeout_secs: env_parse(ENV_GEN_TIMEOUT_SECS, defaults::GEN_TIMEOUT_SECS),
            storage_timeout_secs: env_parse(
                ENV_STORAGE_TIMEOUT_SECS,
                defaults::STORAGE_TIMEOUT_SECS,
            ),
            temp_storage_path: std::env::var(ENV_TEMP_STORAGE_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(defaults::TEMP_STORAGE_PATH)),
            keyframe_interval_seconds: env_parse(
                ENV_KEYFRAME_INTERVAL_SECONDS,
                defaults::KEYFRAME_INTERVAL_SECONDS,
            ),
            max_video_duration_minutes: env_parse(
                ENV_MAX_VIDEO_DURATION_MINUTES,
                defaults::MAX_VIDEO_DURATION_MINUTES,
            ),
            max_video_size_mb: env_parse(ENV_MAX_VIDEO_SIZE_MB, defaults::MAX_VIDEO_SIZE_MB),
        };
        debug!(
            memory_base_url = %config.memory_base_url,
            gen_timeout_secs = config.gen_timeout_secs,
            "Loaded configuration"
        );
        config
    }

    /// Check that required keys are present.
    pub fn validate(&self) -> Result<()> {
        if self.gemini_api_key.is_empty() {
            return Err(Error::Config(format!("{ENV_GEMINI_API_KEY} is required")));
        }
        if self.memory_api_key.is_empty() {
            return Err(Error::Config(format!("{ENV_MEMORY_API_KEY} is required")));
        }
        Ok(())
    }

    /// Create the temp storage directory if it does not exist.
    pub fn ensure_temp_storage(&self) -> Result<()> {
        std::fs::create_dir_all(&self.temp_storage_path)?;
        Ok(())
    }
}
