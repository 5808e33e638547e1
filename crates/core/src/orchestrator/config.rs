//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `[run]` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Jobs per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Cooldown between batches (seconds). Not applied after the last batch.
    #[serde(default = "default_batch_delay")]
    pub batch_delay_secs: u64,
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay() -> u64 {
    60
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_secs: default_batch_delay(),
        }
    }
}

/// Options for a single orchestrator run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Case-insensitive exact names to process; empty means all.
    pub filter: Vec<String>,
    /// Skip jobs already completed in the ledger.
    pub resume: bool,
    /// Jobs per batch. Must be at least 1.
    pub batch_size: usize,
    /// Record placeholders instead of calling external services.
    pub dry_run: bool,
    /// Cooldown between batches.
    pub batch_delay: Duration,
}

impl RunOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            filter: Vec::new(),
            resume: false,
            batch_size: config.batch_size,
            dry_run: false,
            batch_delay: Duration::from_secs(config.batch_delay_secs),
        }
    }

    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from_config(&RunConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.batch_delay_secs, 60);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RunConfig = toml::from_str("batch_size = 2").unwrap();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.batch_delay_secs, 60);
    }

    #[test]
    fn test_options_builders() {
        let options = RunOptions::default()
            .with_filter(vec!["Nurse".to_string()])
            .with_resume(true)
            .with_batch_size(3)
            .with_dry_run(true)
            .with_batch_delay(Duration::from_secs(1));

        assert_eq!(options.filter, vec!["Nurse".to_string()]);
        assert!(options.resume);
        assert_eq!(options.batch_size, 3);
        assert!(options.dry_run);
        assert_eq!(options.batch_delay, Duration::from_secs(1));
    }
}
