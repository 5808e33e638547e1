//! Upload -> write-back -> cleanup -> record.
//!
//! Shared by the orchestrator (after a fresh generation) and the recovery
//! tool (after downloading an existing job), so both entry points publish
//! identically.

use tracing::{info, warn};
use thiserror::Error;

use crate::generation::GeneratedArtifact;
use crate::progress::{ProgressError, ProgressStore};
use crate::repository::{RecordRepository, RepositoryError};
use crate::storage::{ArtifactStore, StorageError};

/// Errors from publishing a staged artifact.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("upload failed: {0}")]
    Storage(#[from] StorageError),

    #[error("write-back failed: {0}")]
    Repository(#[from] RepositoryError),

    #[error("ledger write failed: {0}")]
    Ledger(#[from] ProgressError),
}

/// A staged artifact and the record it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub record_id: &'a str,
    pub artifact: &'a GeneratedArtifact,
}

/// Publish a staged artifact and record the job as completed.
///
/// The scratch file is removed after a successful write-back; a failed
/// removal is logged and does not fail the job. The ledger write is last, so
/// a completed record always points at a published artifact.
pub async fn publish_artifact(
    storage: &dyn ArtifactStore,
    repository: &dyn RecordRepository,
    progress: &mut ProgressStore,
    request: PublishRequest<'_>,
) -> Result<String, PublishError> {
    let url = storage.upload(&request.artifact.path, request.slug).await?;
    repository
        .update_artifact_url(request.record_id, &url)
        .await?;

    if let Err(e) = tokio::fs::remove_file(&request.artifact.path).await {
        warn!(
            "Failed to remove scratch file {}: {}",
            request.artifact.path.display(),
            e
        );
    }

    progress.record_completed(
        request.name,
        request.slug,
        &url,
        Some(&request.artifact.job_id),
    )?;

    info!(job = request.name, url = %url, "Published artifact");
    Ok(url)
}
