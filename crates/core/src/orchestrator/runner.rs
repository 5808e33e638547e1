//! Batch orchestrator implementation.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::clock::{Sleeper, TokioSleeper};
use crate::generation::{GenerationClient, GenerationError};
use crate::progress::{ProgressError, ProgressStore};
use crate::repository::{RecordRepository, RepositoryError};
use crate::source::JobDescriptor;
use crate::storage::ArtifactStore;

use super::config::RunOptions;
use super::publish::{publish_artifact, PublishError, PublishRequest};
use super::types::{JobFailure, JobOutcome, OrchestratorError, RunReport};

/// Artifact URL recorded for dry-run completions.
pub const DRY_RUN_URL_PREFIX: &str = "dry-run://";

/// Failure of a single job. Everything except `Ledger` is recorded and the
/// run continues.
#[derive(Debug, Error)]
enum JobError {
    #[error("record lookup failed: {0}")]
    Lookup(#[from] RepositoryError),

    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("{source}")]
    Publish { source: PublishError, attempts: u32 },

    #[error("{0}")]
    Ledger(#[from] ProgressError),
}

impl JobError {
    fn publish(source: PublishError, attempts: u32) -> Self {
        match source {
            PublishError::Ledger(e) => Self::Ledger(e),
            source => Self::Publish { source, attempts },
        }
    }

    /// Generation attempts spent before the failure.
    fn attempts(&self) -> u32 {
        match self {
            Self::Lookup(_) | Self::Ledger(_) => 0,
            Self::Generation(e) => e.attempts(),
            Self::Publish { attempts, .. } => *attempts,
        }
    }
}

/// Jobs chosen for a run.
#[derive(Debug, Clone, Default)]
pub struct JobSelection {
    /// Jobs to attempt, in source order.
    pub jobs: Vec<JobDescriptor>,
    /// Jobs dropped because the ledger already has them completed.
    pub skipped_completed: usize,
}

/// Apply the name filter and, when resuming, drop completed jobs.
///
/// Order is preserved. Filter names that match no job are logged.
pub fn select_jobs(
    jobs: Vec<JobDescriptor>,
    options: &RunOptions,
    progress: &ProgressStore,
) -> JobSelection {
    let mut jobs = jobs;

    if !options.filter.is_empty() {
        for wanted in &options.filter {
            if !jobs.iter().any(|job| job.matches_name(wanted)) {
                warn!("No job named '{}' in source", wanted);
            }
        }
        jobs.retain(|job| options.filter.iter().any(|wanted| job.matches_name(wanted)));
        info!("Filter selected {} jobs", jobs.len());
    }

    let mut skipped_completed = 0;
    if options.resume {
        let before = jobs.len();
        jobs.retain(|job| !progress.is_completed(&job.name));
        skipped_completed = before - jobs.len();
        info!(
            "Resuming: skipping {} completed jobs, {} remaining",
            skipped_completed,
            jobs.len()
        );
    }

    JobSelection {
        jobs,
        skipped_completed,
    }
}

/// Runs jobs through lookup, generation, publishing, and recording.
///
/// Exactly one job is in flight at a time; the next job starts only after the
/// previous one's outcome has been persisted.
pub struct BatchOrchestrator {
    generation: GenerationClient,
    storage: Arc<dyn ArtifactStore>,
    repository: Arc<dyn RecordRepository>,
    sleeper: Arc<dyn Sleeper>,
}

impl BatchOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        generation: GenerationClient,
        storage: Arc<dyn ArtifactStore>,
        repository: Arc<dyn RecordRepository>,
    ) -> Self {
        Self {
            generation,
            storage,
            repository,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the sleeper used for the inter-batch cooldown.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Process `jobs` according to `options`, recording every outcome in
    /// `progress`.
    ///
    /// Returns an error only when the run cannot continue safely: bad
    /// options, unavailable storage, or an unwritable ledger.
    pub async fn run(
        &self,
        jobs: Vec<JobDescriptor>,
        options: &RunOptions,
        progress: &mut ProgressStore,
    ) -> Result<RunReport, OrchestratorError> {
        if options.batch_size == 0 {
            return Err(OrchestratorError::InvalidOptions(
                "batch size must be at least 1".to_string(),
            ));
        }

        let selection = select_jobs(jobs, options, progress);
        progress.initialize(selection.jobs.len())?;

        let total = selection.jobs.len();
        let batches: Vec<&[JobDescriptor]> = selection.jobs.chunks(options.batch_size).collect();
        let mut report = RunReport {
            selected: total,
            skipped_completed: selection.skipped_completed,
            batches: batches.len(),
            ..Default::default()
        };

        if total == 0 {
            info!("No jobs to process");
            report.summary = progress.summary();
            return Ok(report);
        }

        if options.dry_run {
            info!("Dry run: no generation, upload, or write-back will happen");
            warn!(
                "Dry run records placeholder completions in {}; a later --resume against this \
                 ledger will skip those jobs. Point [progress] path at a separate file for dry runs.",
                progress.path().display()
            );
        } else {
            self.storage.ensure_container_exists().await?;
        }

        info!(
            "Processing {} jobs in {} batches of up to {}",
            total,
            batches.len(),
            options.batch_size
        );

        let mut position = 0;
        for (batch_idx, batch) in batches.iter().enumerate() {
            progress.set_current_batch(batch_idx)?;
            info!(
                "=== Batch {}/{} ({} jobs) ===",
                batch_idx + 1,
                batches.len(),
                batch.len()
            );

            for job in batch.iter() {
                position += 1;
                info!("[{}/{}] {}", position, total, job.name);

                match self.process_job(job, options.dry_run, progress).await? {
                    JobOutcome::Completed { url } => {
                        info!("[{}/{}] {} completed: {}", position, total, job.name, url);
                        report.succeeded += 1;
                    }
                    JobOutcome::Failed { error } => {
                        report.failed += 1;
                        report.failures.push(JobFailure {
                            name: job.name.clone(),
                            error,
                        });
                    }
                }
            }

            if batch_idx + 1 < batches.len() {
                info!(
                    "Batch {} done, cooling down for {}s",
                    batch_idx + 1,
                    options.batch_delay.as_secs()
                );
                self.sleeper.sleep(options.batch_delay).await;
            }
        }

        report.summary = progress.summary();
        info!(
            "Run finished: {} succeeded, {} failed this run",
            report.succeeded, report.failed
        );
        Ok(report)
    }

    /// Run one job and record its outcome. Only ledger failures escape.
    async fn process_job(
        &self,
        job: &JobDescriptor,
        dry_run: bool,
        progress: &mut ProgressStore,
    ) -> Result<JobOutcome, OrchestratorError> {
        match self.execute(job, dry_run, progress).await {
            Ok(url) => Ok(JobOutcome::Completed { url }),
            Err(JobError::Ledger(e)) => {
                error!("Failed to record outcome of {}: {}", job.name, e);
                Err(OrchestratorError::Ledger(e))
            }
            Err(e) => {
                let message = e.to_string();
                error!("{} failed: {}", job.name, message);
                progress.record_failed(&job.name, &job.slug, &message, e.attempts())?;
                Ok(JobOutcome::Failed { error: message })
            }
        }
    }

    async fn execute(
        &self,
        job: &JobDescriptor,
        dry_run: bool,
        progress: &mut ProgressStore,
    ) -> Result<String, JobError> {
        let record = self.repository.find_by_title(&job.name).await?;
        debug!(job = %job.name, record_id = %record.id, "Resolved record");

        if dry_run {
            let url = format!("{}{}", DRY_RUN_URL_PREFIX, job.slug);
            progress.record_completed(&job.name, &job.slug, &url, None)?;
            return Ok(url);
        }

        let artifact = self.generation.generate(&job.prompt, &job.slug).await?;

        publish_artifact(
            self.storage.as_ref(),
            self.repository.as_ref(),
            progress,
            PublishRequest {
                name: &job.name,
                slug: &job.slug,
                record_id: &record.id,
                artifact: &artifact,
            },
        )
        .await
        .map_err(|e| JobError::publish(e, artifact.attempts))
    }
}
