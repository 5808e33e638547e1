//! Submit/poll/download state machine with attempt-level retry.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::clock::{Sleeper, TokioSleeper};

use super::traits::GenerationService;
use super::types::{
    GeneratedArtifact, GenerationError, GenerationJob, GenerationPolicy, GenerationStatus,
    JobStatusReport,
};

/// Drives generation jobs against a [`GenerationService`].
///
/// Stateless between jobs: every call to [`generate`](Self::generate) starts
/// a fresh submission.
pub struct GenerationClient {
    service: Arc<dyn GenerationService>,
    sleeper: Arc<dyn Sleeper>,
    policy: GenerationPolicy,
}

impl GenerationClient {
    /// Create a client that sleeps on the tokio timer.
    pub fn new(service: Arc<dyn GenerationService>, policy: GenerationPolicy) -> Self {
        Self {
            service,
            sleeper: Arc::new(TokioSleeper),
            policy,
        }
    }

    /// Replace the sleeper used for poll intervals and backoff.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Scratch file location for a slug.
    pub fn scratch_path(&self, slug: &str) -> PathBuf {
        self.policy
            .scratch_dir
            .join(format!("{}.{}", slug, self.policy.extension))
    }

    /// Generate an artifact for `prompt` and stage it under the slug's
    /// scratch path.
    ///
    /// Submit, poll and download are retried together as one unit, up to
    /// `max_attempts` times with exponential backoff between attempts. Once
    /// attempts are exhausted the last failure is wrapped in
    /// [`GenerationError::Exhausted`].
    pub async fn generate(
        &self,
        prompt: &str,
        slug: &str,
    ) -> Result<GeneratedArtifact, GenerationError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.attempt(prompt, slug).await {
                Ok(job) => {
                    let path = job
                        .artifact_path
                        .unwrap_or_else(|| self.scratch_path(slug));
                    return Ok(GeneratedArtifact {
                        job_id: job.job_id,
                        path,
                        attempts: attempt,
                    });
                }
                Err(e) if attempt < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        slug,
                        attempt,
                        max_attempts,
                        "Generation attempt failed: {}; retrying in {}s",
                        e,
                        delay.as_secs()
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(slug, attempts = attempt, "Generation failed: {}", e);
                    return Err(GenerationError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
            }
        }
    }

    /// One submit -> poll -> download pass.
    async fn attempt(&self, prompt: &str, slug: &str) -> Result<GenerationJob, GenerationError> {
        let job_id = self
            .service
            .submit(prompt)
            .await
            .map_err(|e| GenerationError::Submission(e.to_string()))?;
        info!(slug, job_id = %job_id, "Submitted generation job");

        let mut job = self.poll_until_complete(&job_id).await?;
        let path = self.download_to_scratch(&job_id, slug).await?;
        job.artifact_path = Some(path);
        Ok(job)
    }

    /// Poll a job until it reaches a terminal state or the poll budget runs
    /// out.
    ///
    /// A `Failed` status returns immediately. Transport errors while polling
    /// are logged and consume one poll from the budget.
    pub async fn poll_until_complete(
        &self,
        job_id: &str,
    ) -> Result<GenerationJob, GenerationError> {
        let mut job = GenerationJob::submitted(job_id);
        let max_polls = self.policy.max_poll_attempts;

        for poll in 1..=max_polls {
            if poll > 1 {
                self.sleeper.sleep(self.policy.poll_interval).await;
            }

            let report = match self.service.status(job_id).await {
                Ok(report) => report,
                Err(e) => {
                    warn!(job_id, poll, max_polls, "Status poll failed: {}", e);
                    continue;
                }
            };

            job.apply(&report);
            debug!(
                job_id,
                poll,
                status = %job.status,
                progress = job.progress_percent,
                "Polled generation job"
            );

            match job.status {
                GenerationStatus::Completed => return Ok(job),
                GenerationStatus::Failed => {
                    let detail = job
                        .error_detail
                        .clone()
                        .unwrap_or_else(|| "service reported failure".to_string());
                    return Err(GenerationError::GenerationFailed(detail));
                }
                _ => {}
            }
        }

        job.status = GenerationStatus::TimedOut;
        Err(GenerationError::PollTimeout {
            job_id: job_id.to_string(),
            attempts: max_polls,
        })
    }

    /// Single status lookup with no polling; used for recovery.
    pub async fn fetch_status(&self, job_id: &str) -> Result<JobStatusReport, GenerationError> {
        self.service.status(job_id).await
    }

    /// Download the artifact of an already-completed job without
    /// resubmitting it.
    ///
    /// The returned artifact reports zero attempts since no generation was
    /// performed by this call.
    pub async fn download_existing(
        &self,
        job_id: &str,
        slug: &str,
    ) -> Result<GeneratedArtifact, GenerationError> {
        let path = self.download_to_scratch(job_id, slug).await?;
        Ok(GeneratedArtifact {
            job_id: job_id.to_string(),
            path,
            attempts: 0,
        })
    }

    async fn download_to_scratch(
        &self,
        job_id: &str,
        slug: &str,
    ) -> Result<PathBuf, GenerationError> {
        let bytes = self
            .service
            .content(job_id)
            .await
            .map_err(|e| GenerationError::Download(e.to_string()))?;

        if bytes.is_empty() {
            return Err(GenerationError::Download(format!(
                "job {} returned an empty artifact",
                job_id
            )));
        }

        tokio::fs::create_dir_all(&self.policy.scratch_dir)
            .await
            .map_err(|e| {
                GenerationError::Download(format!(
                    "failed to create {}: {}",
                    self.policy.scratch_dir.display(),
                    e
                ))
            })?;

        let path = self.scratch_path(slug);
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            GenerationError::Download(format!("failed to write {}: {}", path.display(), e))
        })?;

        info!(
            job_id,
            path = %path.display(),
            bytes = bytes.len(),
            "Downloaded artifact"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::testing::{MockGenerationService, MockPoll, RecordingSleeper};

    struct Harness {
        service: Arc<MockGenerationService>,
        sleeper: Arc<RecordingSleeper>,
        client: GenerationClient,
        _scratch: TempDir,
    }

    fn harness_with(policy: impl FnOnce(&mut GenerationPolicy)) -> Harness {
        let scratch = TempDir::new().unwrap();
        let mut p = GenerationPolicy {
            scratch_dir: scratch.path().join("videos"),
            ..Default::default()
        };
        policy(&mut p);

        let service = Arc::new(MockGenerationService::new());
        let sleeper = Arc::new(RecordingSleeper::new());
        let client = GenerationClient::new(service.clone(), p).with_sleeper(sleeper.clone());

        Harness {
            service,
            sleeper,
            client,
            _scratch: scratch,
        }
    }

    fn harness() -> Harness {
        harness_with(|_| {})
    }

    #[tokio::test]
    async fn test_generate_immediate_completion() {
        let h = harness();
        h.service.set_content(b"fake-mp4".to_vec()).await;

        let artifact = h.client.generate("a nurse", "registered-nurse").await.unwrap();

        assert_eq!(artifact.attempts, 1);
        assert!(artifact.path.ends_with("registered-nurse.mp4"));
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"fake-mp4");
        assert_eq!(h.service.submit_count().await, 1);
        assert!(h.sleeper.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_generate_polls_until_complete() {
        let h = harness();
        h.service
            .queue_polls(vec![
                MockPoll::queued(),
                MockPoll::processing(40),
                MockPoll::completed(),
            ])
            .await;

        let artifact = h.client.generate("prompt", "slug").await.unwrap();

        assert_eq!(artifact.attempts, 1);
        assert_eq!(h.service.status_count().await, 3);
        assert_eq!(
            h.sleeper.recorded().await,
            vec![Duration::from_secs(10), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_retry_bound_with_backoff() {
        let h = harness();
        h.service.fail_submissions("connection reset").await;

        let err = h.client.generate("prompt", "slug").await.unwrap_err();

        assert_eq!(h.service.submit_count().await, 3);
        assert_eq!(
            h.sleeper.recorded().await,
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
        match err {
            GenerationError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, GenerationError::Submission(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_status_stops_polling() {
        let h = harness_with(|p| p.max_attempts = 1);
        h.service
            .queue_polls(vec![
                MockPoll::processing(10),
                MockPoll::failed("content policy violation"),
                MockPoll::processing(20),
            ])
            .await;

        let err = h.client.generate("prompt", "slug").await.unwrap_err();

        assert_eq!(h.service.status_count().await, 2);
        assert_eq!(h.service.content_count().await, 0);
        assert!(err.is_terminal_status());
        assert!(err.to_string().contains("content policy violation"));
    }

    #[tokio::test]
    async fn test_failed_status_consumes_one_attempt_then_retries() {
        let h = harness();
        h.service.queue_polls(vec![MockPoll::failed("flaky")]).await;

        let artifact = h.client.generate("prompt", "slug").await.unwrap();

        assert_eq!(artifact.attempts, 2);
        assert_eq!(h.service.submit_count().await, 2);
        assert_eq!(h.sleeper.recorded().await, vec![Duration::from_secs(5)]);
    }

    #[tokio::test]
    async fn test_transient_poll_errors_consume_budget() {
        let h = harness_with(|p| p.max_poll_attempts = 3);
        h.service
            .queue_polls(vec![
                MockPoll::transport("502 bad gateway"),
                MockPoll::transport("timeout"),
                MockPoll::transport("timeout"),
            ])
            .await;

        let err = h.client.poll_until_complete("video_0001").await.unwrap_err();

        assert!(matches!(
            err,
            GenerationError::PollTimeout { attempts: 3, .. }
        ));
        assert_eq!(h.service.status_count().await, 3);
    }

    #[tokio::test]
    async fn test_transient_poll_error_then_completion() {
        let h = harness();
        h.service
            .queue_polls(vec![MockPoll::transport("timeout"), MockPoll::completed()])
            .await;

        let job = h.client.poll_until_complete("video_0001").await.unwrap();
        assert_eq!(job.status, GenerationStatus::Completed);
        assert_eq!(job.progress_percent, 100);
    }

    #[tokio::test]
    async fn test_poll_timeout_when_never_terminal() {
        let h = harness_with(|p| {
            p.max_poll_attempts = 4;
            p.max_attempts = 1;
        });
        h.service
            .queue_polls((0..10).map(|_| MockPoll::processing(50)).collect())
            .await;

        let err = h.client.generate("prompt", "slug").await.unwrap_err();

        assert_eq!(h.service.status_count().await, 4);
        assert_eq!(h.sleeper.recorded().await.len(), 3);
        match err {
            GenerationError::Exhausted { last, .. } => {
                assert!(matches!(*last, GenerationError::PollTimeout { .. }))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_failure_is_retried() {
        let h = harness();
        h.service.fail_downloads("connection closed").await;

        let err = h.client.generate("prompt", "slug").await.unwrap_err();

        assert_eq!(err.attempts(), 3);
        assert_eq!(h.service.content_count().await, 3);
        match err {
            GenerationError::Exhausted { last, .. } => {
                assert!(matches!(*last, GenerationError::Download(_)))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_existing_never_submits() {
        let h = harness();
        h.service.set_content(b"recovered".to_vec()).await;

        let artifact = h
            .client
            .download_existing("video_0042", "welder")
            .await
            .unwrap();

        assert_eq!(artifact.job_id, "video_0042");
        assert_eq!(artifact.attempts, 0);
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"recovered");
        assert_eq!(h.service.submit_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_download_is_an_error() {
        let h = harness_with(|p| p.max_attempts = 1);
        h.service.set_content(Vec::new()).await;

        let err = h.client.generate("prompt", "slug").await.unwrap_err();
        assert!(err.to_string().contains("empty artifact"));
    }
}
