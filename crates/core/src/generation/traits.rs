//! Transport trait for the generation service.

use async_trait::async_trait;

use super::types::{GenerationError, JobStatusReport};

/// Raw operations exposed by an asynchronous generation service.
///
/// Implementations perform a single request per call and never retry;
/// retry and polling policy live in [`GenerationClient`](super::GenerationClient).
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Returns the name of this service implementation.
    fn name(&self) -> &str;

    /// Submit a prompt and return the service-issued job id.
    ///
    /// Not idempotent: every call creates (and bills) a new job.
    async fn submit(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Fetch the current status of a job.
    async fn status(&self, job_id: &str) -> Result<JobStatusReport, GenerationError>;

    /// Fetch the artifact bytes of a completed job.
    async fn content(&self, job_id: &str) -> Result<Vec<u8>, GenerationError>;
}
