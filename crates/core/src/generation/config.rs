//! Generation service configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the video generation service and its polling policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// API key (bearer token).
    pub api_key: String,

    /// API base URL (default: https://api.openai.com/v1).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Clip length in seconds.
    #[serde(default = "default_seconds")]
    pub seconds: u32,

    /// Output resolution, e.g. "1280x720".
    #[serde(default = "default_size")]
    pub size: String,

    /// Delay between status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Poll budget per attempt (120 polls at 10s is ~20 minutes).
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Total submit+poll+download attempts per job.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First retry delay; doubles on each further retry.
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Where downloaded artifacts are staged before upload.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// File extension of downloaded artifacts (without the dot).
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "sora-2".to_string()
}

fn default_seconds() -> u32 {
    8
}

fn default_size() -> String {
    "1280x720".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_max_poll_attempts() -> u32 {
    120
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base() -> u64 {
    5
}

fn default_timeout() -> u64 {
    60
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("tmp/videos")
}

fn default_extension() -> String {
    "mp4".to_string()
}
