//! Recovery for jobs whose generation finished but whose completion never
//! reached the ledger (for example, the process died between download and
//! record).
//!
//! Recovery works from the service-issued job id and never resubmits:
//! submission is not idempotent and would bill a second generation.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::generation::{GenerationClient, GenerationError, GenerationStatus};
use crate::orchestrator::{publish_artifact, PublishError, PublishRequest};
use crate::progress::ProgressStore;
use crate::repository::{RecordRepository, RepositoryError};
use crate::source::slugify;
use crate::storage::ArtifactStore;

/// Errors that abort a recovery.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// The name does not produce a usable slug.
    #[error("'{0}' does not produce a valid slug")]
    InvalidName(String),

    /// The job exists but has not completed.
    #[error("job {job_id} is {status}, not completed")]
    NotCompleted {
        job_id: String,
        status: GenerationStatus,
    },

    #[error("generation service error: {0}")]
    Generation(#[from] GenerationError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Which job to recover.
#[derive(Debug, Clone)]
pub struct RecoveryRequest {
    pub job_id: String,
    pub name: String,
}

/// What a recovery published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryOutcome {
    pub record_id: String,
    pub artifact_url: String,
}

/// Publishes an already-generated artifact through the same path the
/// orchestrator uses.
pub struct RecoveryTool {
    generation: GenerationClient,
    storage: Arc<dyn ArtifactStore>,
    repository: Arc<dyn RecordRepository>,
}

impl RecoveryTool {
    pub fn new(
        generation: GenerationClient,
        storage: Arc<dyn ArtifactStore>,
        repository: Arc<dyn RecordRepository>,
    ) -> Self {
        Self {
            generation,
            storage,
            repository,
        }
    }

    /// Recover one job: check status, resolve the record, download by job
    /// id, then publish and record `completed` in `progress`.
    pub async fn recover(
        &self,
        request: &RecoveryRequest,
        progress: &mut ProgressStore,
    ) -> Result<RecoveryOutcome, RecoveryError> {
        if slugify(&request.name).is_empty() {
            return Err(RecoveryError::InvalidName(request.name.clone()));
        }

        let report = self.generation.fetch_status(&request.job_id).await?;
        if report.status != GenerationStatus::Completed {
            return Err(RecoveryError::NotCompleted {
                job_id: request.job_id.clone(),
                status: report.status,
            });
        }
        info!("Job {} is completed, recovering {}", request.job_id, request.name);

        let record = self.repository.find_by_title(&request.name).await?;

        // Record under the name the ledger already knows, so a differently
        // typed name cannot leave the job in both lists.
        let name = progress
            .recorded_name(&request.name)
            .unwrap_or(&record.title)
            .to_string();
        if name != request.name {
            debug!("Recording {:?} as {:?}", request.name, name);
        }
        if progress.is_completed(&name) {
            warn!(
                "{} is already completed in the ledger; republishing anyway",
                name
            );
        }

        let slug = slugify(&name);
        let artifact = self
            .generation
            .download_existing(&request.job_id, &slug)
            .await?;

        let artifact_url = publish_artifact(
            self.storage.as_ref(),
            self.repository.as_ref(),
            progress,
            PublishRequest {
                name: &name,
                slug: &slug,
                record_id: &record.id,
                artifact: &artifact,
            },
        )
        .await?;

        info!("Recovered {} -> {}", name, artifact_url);
        Ok(RecoveryOutcome {
            record_id: record.id,
            artifact_url,
        })
    }
}
