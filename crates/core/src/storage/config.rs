//! Object storage configuration.

use serde::{Deserialize, Serialize};

/// Supabase-style object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Project URL, e.g. "https://xyz.supabase.co".
    pub url: String,

    /// Service role key; needs bucket create and object write rights.
    pub service_key: String,

    /// Bucket holding the artifacts.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Create the bucket as public so artifact URLs are directly servable.
    #[serde(default = "default_public")]
    pub public: bool,

    /// Content type sent with uploads.
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Object key extension (without the dot).
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Per-request HTTP timeout. Uploads are large; keep this generous.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_bucket() -> String {
    "videos".to_string()
}

fn default_public() -> bool {
    true
}

fn default_content_type() -> String {
    "video/mp4".to_string()
}

fn default_extension() -> String {
    "mp4".to_string()
}

fn default_timeout() -> u64 {
    300
}
