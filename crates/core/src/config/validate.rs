use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Credentials and service URLs are non-empty
/// - Batch size, poll interval, poll budget and attempt count are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let required = [
        ("generation.api_key", &config.generation.api_key),
        ("generation.base_url", &config.generation.base_url),
        ("storage.url", &config.storage.url),
        ("storage.service_key", &config.storage.service_key),
        ("storage.bucket", &config.storage.bucket),
        ("repository.url", &config.repository.url),
        ("repository.api_token", &config.repository.api_token),
        ("repository.collection", &config.repository.collection),
    ];
    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                key
            )));
        }
    }

    let positive = [
        ("run.batch_size", config.run.batch_size as u64),
        (
            "generation.poll_interval_secs",
            config.generation.poll_interval_secs,
        ),
        (
            "generation.max_poll_attempts",
            config.generation.max_poll_attempts as u64,
        ),
        ("generation.max_attempts", config.generation.max_attempts as u64),
    ];
    for (key, value) in positive {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be 0",
                key
            )));
        }
    }

    Ok(())
}
