//! Batch orchestrator.
//!
//! Drives the job list through lookup -> generate -> upload -> write-back ->
//! record, one job at a time:
//! - **Batches**: fixed-size, order-preserving slices with a cooldown between
//!   them to smooth load on the generation service.
//! - **Isolation**: any job-level error becomes a `failed` ledger entry and the
//!   run moves on. Only a ledger write failure aborts the run.
//! - **Resume**: jobs already `completed` in the ledger are skipped.

mod config;
mod publish;
mod runner;
mod types;

pub use config::{RunConfig, RunOptions};
pub use publish::{publish_artifact, PublishError, PublishRequest};
pub use runner::{select_jobs, BatchOrchestrator, JobSelection, DRY_RUN_URL_PREFIX};
pub use types::{JobFailure, JobOutcome, OrchestratorError, RunReport};
