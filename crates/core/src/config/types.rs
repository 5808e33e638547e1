use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::generation::GenerationConfig;
use crate::orchestrator::RunConfig;
use crate::repository::RepositoryConfig;
use crate::storage::StorageConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub run: RunConfig,
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
    pub repository: RepositoryConfig,
}

/// Job source configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceConfig {
    /// CSV file with `name` and `prompt` columns. Can be overridden per run.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Progress ledger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressConfig {
    #[serde(default = "default_progress_path")]
    pub path: PathBuf,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            path: default_progress_path(),
        }
    }
}

fn default_progress_path() -> PathBuf {
    PathBuf::from("progress.json")
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub source: SourceConfig,
    pub progress: ProgressConfig,
    pub run: RunConfig,
    pub generation: SanitizedGenerationConfig,
    pub storage: SanitizedStorageConfig,
    pub repository: SanitizedRepositoryConfig,
}

/// Generation config with the API key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGenerationConfig {
    pub base_url: String,
    pub model: String,
    pub seconds: u32,
    pub size: String,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
    pub scratch_dir: PathBuf,
    pub api_key_configured: bool,
}

/// Storage config with the service key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub url: String,
    pub bucket: String,
    pub public: bool,
    pub service_key_configured: bool,
}

/// Repository config with the API token hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRepositoryConfig {
    pub url: String,
    pub collection: String,
    pub title_field: String,
    pub artifact_field: String,
    pub api_token_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let generation = &config.generation;
        let storage = &config.storage;
        let repository = &config.repository;
        Self {
            source: config.source.clone(),
            progress: config.progress.clone(),
            run: config.run.clone(),
            generation: SanitizedGenerationConfig {
                base_url: generation.base_url.clone(),
                model: generation.model.clone(),
                seconds: generation.seconds,
                size: generation.size.clone(),
                poll_interval_secs: generation.poll_interval_secs,
                max_poll_attempts: generation.max_poll_attempts,
                max_attempts: generation.max_attempts,
                backoff_base_secs: generation.backoff_base_secs,
                scratch_dir: generation.scratch_dir.clone(),
                api_key_configured: !generation.api_key.is_empty(),
            },
            storage: SanitizedStorageConfig {
                url: storage.url.clone(),
                bucket: storage.bucket.clone(),
                public: storage.public,
                service_key_configured: !storage.service_key.is_empty(),
            },
            repository: SanitizedRepositoryConfig {
                url: repository.url.clone(),
                collection: repository.collection.clone(),
                title_field: repository.title_field.clone(),
                artifact_field: repository.artifact_field.clone(),
                api_token_configured: !repository.api_token.is_empty(),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const MINIMAL: &str = r#"
[generation]
api_key = "sk-test"

[storage]
url = "https://xyz.supabase.co"
service_key = "service-role"

[repository]
url = "https://cms.example.com/api"
api_token = "cms-token"
"#;

    #[test]
    fn test_deserialize_minimal_config() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert!(config.source.path.is_none());
        assert_eq!(config.progress.path, PathBuf::from("progress.json"));
        assert_eq!(config.run.batch_size, 5);
        assert_eq!(config.run.batch_delay_secs, 60);
        assert_eq!(config.generation.model, "sora-2");
        assert_eq!(config.storage.bucket, "videos");
        assert_eq!(config.repository.collection, "careers");
        assert_eq!(config.repository.artifact_field, "videoUrl");
    }

    #[test]
    fn test_deserialize_source_and_run_sections() {
        let toml = format!(
            r#"{}
[source]
path = "data/careers.csv"

[progress]
path = "state/progress.json"

[run]
batch_size = 2
batch_delay_secs = 5
"#,
            MINIMAL
        );
        let config: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.source.path, Some(PathBuf::from("data/careers.csv")));
        assert_eq!(config.progress.path, PathBuf::from("state/progress.json"));
        assert_eq!(config.run.batch_size, 2);
        assert_eq!(config.run.batch_delay_secs, 5);
    }

    #[test]
    fn test_missing_generation_section_fails() {
        let toml = r#"
[storage]
url = "https://xyz.supabase.co"
service_key = "k"

[repository]
url = "https://cms.example.com/api"
api_token = "t"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        assert!(sanitized.generation.api_key_configured);
        assert!(sanitized.storage.service_key_configured);
        assert!(sanitized.repository.api_token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("sk-test"));
        assert!(!json.contains("service-role"));
        assert!(!json.contains("cms-token"));
        assert!(json.contains("https://xyz.supabase.co"));
    }

    #[test]
    fn test_sanitized_config_reports_empty_secret() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.repository.api_token.clear();
        let sanitized = SanitizedConfig::from(&config);
        assert!(!sanitized.repository.api_token_configured);
    }
}
