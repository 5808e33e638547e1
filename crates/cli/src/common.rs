//! Startup shared by both binaries: logging, configuration, service wiring.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelforge_core::{
    load_config, validate_config, ArtifactStore, Config, GenerationClient, GenerationPolicy,
    OpenAiVideoService, RecordRepository, RestRepository, SanitizedConfig, SupabaseStorage,
};

/// Default config file, overridable with `--config` or `REELFORGE_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "reelforge.toml";

/// Concrete clients built from configuration.
pub struct Services {
    pub generation: GenerationClient,
    pub storage: Arc<dyn ArtifactStore>,
    pub repository: Arc<dyn RecordRepository>,
}

pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load and validate configuration, logging it with secrets redacted.
pub fn load_and_validate(path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", path);
    let config =
        load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!("Configuration loaded: {}", sanitized);
    Ok(config)
}

pub fn build_services(config: &Config) -> Result<Services> {
    let service = OpenAiVideoService::new(&config.generation)
        .context("Failed to create generation client")?;
    let generation = GenerationClient::new(
        Arc::new(service),
        GenerationPolicy::from(&config.generation),
    );
    let policy = generation.policy();
    info!(
        "Generation: {} model {}, poll every {}s up to {} times, {} attempts",
        generation.service_name(),
        config.generation.model,
        policy.poll_interval.as_secs(),
        policy.max_poll_attempts,
        policy.max_attempts
    );

    let storage: Arc<dyn ArtifactStore> = Arc::new(
        SupabaseStorage::new(config.storage.clone()).context("Failed to create storage client")?,
    );
    info!(
        "Storage: {} bucket '{}'",
        storage.name(),
        config.storage.bucket
    );

    let repository: Arc<dyn RecordRepository> = Arc::new(
        RestRepository::new(config.repository.clone())
            .context("Failed to create repository client")?,
    );
    info!(
        "Repository: {} collection '{}'",
        repository.name(),
        config.repository.collection
    );

    Ok(Services {
        generation,
        storage,
        repository,
    })
}
