//! Types for generation jobs.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::GenerationConfig;

/// Errors raised while generating an artifact.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network-level failure talking to the service.
    #[error("transport error: {0}")]
    Transport(String),

    /// Service answered with a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Service response could not be parsed.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Submitting the prompt failed.
    #[error("submission failed: {0}")]
    Submission(String),

    /// The service reported the job as failed.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// The job did not reach a terminal state within the poll budget.
    #[error("job {job_id} still running after {attempts} polls")]
    PollTimeout { job_id: String, attempts: u32 },

    /// Fetching or staging the artifact bytes failed.
    #[error("download failed: {0}")]
    Download(String),

    /// Every attempt failed; wraps the last underlying error.
    #[error("giving up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Number of generation attempts this error represents.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
            _ => 1,
        }
    }

    /// Whether the service itself reported a definitive failure.
    pub fn is_terminal_status(&self) -> bool {
        match self {
            Self::GenerationFailed(_) => true,
            Self::Exhausted { last, .. } => last.is_terminal_status(),
            _ => false,
        }
    }
}

/// Status of a generation job as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    /// Local status: the poll budget ran out before a terminal state.
    TimedOut,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Queued => "queued",
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
            GenerationStatus::TimedOut => "timed_out",
        }
    }

    /// Whether the service will not transition the job any further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationStatus::Completed | GenerationStatus::Failed | GenerationStatus::TimedOut
        )
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status poll response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatusReport {
    pub status: GenerationStatus,
    pub progress_percent: u8,
    pub error: Option<String>,
}

impl JobStatusReport {
    pub fn new(status: GenerationStatus, progress_percent: u8) -> Self {
        Self {
            status,
            progress_percent,
            error: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: GenerationStatus::Failed,
            progress_percent: 0,
            error: Some(detail.into()),
        }
    }
}

/// In-memory state of one active attempt.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub job_id: String,
    pub status: GenerationStatus,
    pub progress_percent: u8,
    pub artifact_path: Option<PathBuf>,
    pub error_detail: Option<String>,
}

impl GenerationJob {
    pub fn submitted(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: GenerationStatus::Queued,
            progress_percent: 0,
            artifact_path: None,
            error_detail: None,
        }
    }

    /// Fold a poll response into the job.
    pub fn apply(&mut self, report: &JobStatusReport) {
        self.status = report.status;
        self.progress_percent = report.progress_percent;
        if report.error.is_some() {
            self.error_detail = report.error.clone();
        }
    }
}

/// A downloaded artifact staged on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Service-issued job handle; needed to recover without resubmitting.
    pub job_id: String,
    /// Local scratch file holding the bytes.
    pub path: PathBuf,
    /// Attempts it took to produce this artifact.
    pub attempts: u32,
}

/// Polling and retry policy for [`GenerationClient`](super::GenerationClient).
#[derive(Debug, Clone)]
pub struct GenerationPolicy {
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub scratch_dir: PathBuf,
    pub extension: String,
}

impl GenerationPolicy {
    /// Delay before retry number `retry` (1-based): base, 2*base, 4*base, ...
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_base.saturating_mul(factor)
    }
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            max_poll_attempts: 120,
            max_attempts: 3,
            backoff_base: Duration::from_secs(5),
            scratch_dir: PathBuf::from("tmp/videos"),
            extension: "mp4".to_string(),
        }
    }
}

impl From<&GenerationConfig> for GenerationPolicy {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_poll_attempts: config.max_poll_attempts,
            max_attempts: config.max_attempts,
            backoff_base: Duration::from_secs(config.backoff_base_secs),
            scratch_dir: config.scratch_dir.clone(),
            extension: config.extension.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = GenerationPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(5));
        assert_eq!(policy.backoff(2), Duration::from_secs(10));
        assert_eq!(policy.backoff(3), Duration::from_secs(20));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(GenerationStatus::Completed.is_terminal());
        assert!(GenerationStatus::Failed.is_terminal());
        assert!(GenerationStatus::TimedOut.is_terminal());
        assert!(!GenerationStatus::Queued.is_terminal());
        assert!(!GenerationStatus::Processing.is_terminal());
    }

    #[test]
    fn test_exhausted_reports_attempts_and_last_error() {
        let err = GenerationError::Exhausted {
            attempts: 3,
            last: Box::new(GenerationError::GenerationFailed("moderation".to_string())),
        };
        assert_eq!(err.attempts(), 3);
        assert!(err.is_terminal_status());
        assert_eq!(
            err.to_string(),
            "giving up after 3 attempts: generation failed: moderation"
        );
    }

    #[test]
    fn test_job_apply_keeps_error_detail() {
        let mut job = GenerationJob::submitted("video_1");
        job.apply(&JobStatusReport::new(GenerationStatus::Processing, 40));
        assert_eq!(job.status, GenerationStatus::Processing);
        assert_eq!(job.progress_percent, 40);

        job.apply(&JobStatusReport::failed("content policy"));
        assert_eq!(job.status, GenerationStatus::Failed);
        assert_eq!(job.error_detail.as_deref(), Some("content policy"));
    }

    #[test]
    fn test_policy_from_config() {
        let config: GenerationConfig = toml::from_str(
            r#"
            api_key = "k"
            poll_interval_secs = 3
            backoff_base_secs = 1
        "#,
        )
        .unwrap();
        let policy = GenerationPolicy::from(&config);
        assert_eq!(policy.poll_interval, Duration::from_secs(3));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
    }
}
