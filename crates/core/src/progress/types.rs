//! Ledger document types.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while persisting the ledger.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// Writing the ledger file failed.
    #[error("failed to write progress file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the ledger failed.
    #[error("failed to serialize progress state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A job whose artifact was published and written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedJob {
    pub name: String,
    pub slug: String,
    pub artifact_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A job that ended in an unrecovered error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedJob {
    pub name: String,
    pub slug: String,
    pub error: String,
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
}

/// One outcome entry in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressRecord {
    Completed(CompletedJob),
    Failed(FailedJob),
}

impl ProgressRecord {
    /// Name of the job this record belongs to.
    pub fn name(&self) -> &str {
        match self {
            ProgressRecord::Completed(job) => &job.name,
            ProgressRecord::Failed(job) => &job.name,
        }
    }

    /// Whether this record marks the job as done.
    pub fn is_completed(&self) -> bool {
        matches!(self, ProgressRecord::Completed(_))
    }
}

/// The persisted ledger document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub started_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub total_jobs: usize,
    #[serde(default)]
    pub completed: Vec<CompletedJob>,
    #[serde(default)]
    pub failed: Vec<FailedJob>,
    #[serde(default)]
    pub current_batch_index: usize,
}

impl ProgressState {
    /// Fresh, empty state stamped with the current time.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            last_updated_at: now,
            total_jobs: 0,
            completed: Vec::new(),
            failed: Vec::new(),
            current_batch_index: 0,
        }
    }

    /// Whether no outcome has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.failed.is_empty()
    }

    /// Aggregate counts for reporting.
    pub fn summary(&self) -> ProgressSummary {
        let completed = self.completed.len();
        let failed = self.failed.len();
        let remaining = self.total_jobs.saturating_sub(completed + failed);
        let attempted = completed + failed;
        let success_rate = if attempted == 0 {
            0.0
        } else {
            completed as f64 / attempted as f64 * 100.0
        };

        ProgressSummary {
            total: self.total_jobs,
            completed,
            failed,
            remaining,
            success_rate,
        }
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts derived from the ledger; observability only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub remaining: usize,
    /// Completed as a percentage of attempted (completed + failed).
    pub success_rate: f64,
}

impl fmt::Display for ProgressSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+--------------+----------+")?;
        writeln!(f, "| Total        | {:>8} |", self.total)?;
        writeln!(f, "| Completed    | {:>8} |", self.completed)?;
        writeln!(f, "| Failed       | {:>8} |", self.failed)?;
        writeln!(f, "| Remaining    | {:>8} |", self.remaining)?;
        writeln!(f, "| Success rate | {:>7.1}% |", self.success_rate)?;
        write!(f, "+--------------+----------+")
    }
}
