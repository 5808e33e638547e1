//! Types for the batch orchestrator.

use serde::Serialize;
use thiserror::Error;

use crate::progress::{ProgressError, ProgressSummary};
use crate::storage::StorageError;

/// Errors that abort a whole run.
///
/// Job-level failures never surface here; they are recorded in the ledger.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Run options are unusable.
    #[error("invalid run options: {0}")]
    InvalidOptions(String),

    /// The storage container could not be prepared before the first job.
    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),

    /// The ledger could not be written; continuing would break resume.
    #[error("progress ledger error: {0}")]
    Ledger(#[from] ProgressError),
}

/// Result of processing one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { url: String },
    Failed { error: String },
}

/// A failed job as reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobFailure {
    pub name: String,
    pub error: String,
}

/// What a run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Jobs attempted in this run.
    pub selected: usize,
    /// Jobs skipped because the ledger already has them completed.
    pub skipped_completed: usize,
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<JobFailure>,
    /// Ledger-wide counts after the run.
    pub summary: ProgressSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::InvalidOptions("batch size must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid run options: batch size must be at least 1"
        );
    }

    #[test]
    fn test_report_default() {
        let report = RunReport::default();
        assert_eq!(report.selected, 0);
        assert!(report.failures.is_empty());
        assert_eq!(report.summary.total, 0);
    }
}
