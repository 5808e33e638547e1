//! Content repository configuration.

use serde::{Deserialize, Serialize};

/// REST content repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// API base URL, e.g. "https://cms.example.com/api".
    pub url: String,

    /// API token (bearer).
    pub api_token: String,

    /// Collection holding the records.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Field matched against the job name.
    #[serde(default = "default_title_field")]
    pub title_field: String,

    /// Field that receives the artifact URL.
    #[serde(default = "default_artifact_field")]
    pub artifact_field: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_collection() -> String {
    "careers".to_string()
}

fn default_title_field() -> String {
    "title".to_string()
}

fn default_artifact_field() -> String {
    "videoUrl".to_string()
}

fn default_timeout() -> u64 {
    30
}
