//! JSON-file backed progress store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::repository::normalize_title;

use super::types::{
    CompletedJob, FailedJob, ProgressError, ProgressRecord, ProgressState, ProgressSummary,
};

/// Durable ledger of per-job outcomes.
///
/// Owned by a single writer (the orchestrator or the recovery tool). Every
/// mutating call rewrites the whole document through a temp file and rename,
/// so the file on disk is valid JSON after any write.
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    state: ProgressState,
}

impl ProgressStore {
    /// Load the ledger at `path`.
    ///
    /// A missing file yields a fresh state. An unreadable or corrupt file is
    /// logged, moved aside to `<path>.corrupt`, and replaced by a fresh state;
    /// it never blocks a run.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match fs::read(&path) {
            Ok(contents) => match serde_json::from_slice::<ProgressState>(&contents) {
                Ok(state) => {
                    info!(
                        "Loaded progress from {} ({} completed, {} failed)",
                        path.display(),
                        state.completed.len(),
                        state.failed.len()
                    );
                    state
                }
                Err(e) => {
                    warn!(
                        "Progress file {} is corrupt ({}), starting fresh",
                        path.display(),
                        e
                    );
                    Self::quarantine(&path);
                    ProgressState::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No progress file at {}, starting fresh", path.display());
                ProgressState::new()
            }
            Err(e) => {
                warn!(
                    "Failed to read progress file {} ({}), starting fresh",
                    path.display(),
                    e
                );
                Self::quarantine(&path);
                ProgressState::new()
            }
        };

        Self { path, state }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory state (always equal to what was last persisted).
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Stamp the run start and total, only on the first run of a lineage.
    ///
    /// Once any outcome exists the clock and totals are left untouched, so a
    /// resumed run keeps reporting against the original job count.
    pub fn initialize(&mut self, total: usize) -> Result<(), ProgressError> {
        if !self.state.is_empty() {
            debug!(
                "Progress already has outcomes, keeping start time and total of {}",
                self.state.total_jobs
            );
            return Ok(());
        }

        let now = Utc::now();
        self.state.started_at = now;
        self.state.last_updated_at = now;
        self.state.total_jobs = total;
        self.state.current_batch_index = 0;
        self.persist()
    }

    /// Record a completed job and persist.
    pub fn record_completed(
        &mut self,
        name: &str,
        slug: &str,
        artifact_url: &str,
        job_id: Option<&str>,
    ) -> Result<(), ProgressError> {
        self.record(ProgressRecord::Completed(CompletedJob {
            name: name.to_string(),
            slug: slug.to_string(),
            artifact_url: artifact_url.to_string(),
            job_id: job_id.map(str::to_string),
            timestamp: Utc::now(),
        }))
    }

    /// Record a failed job and persist.
    pub fn record_failed(
        &mut self,
        name: &str,
        slug: &str,
        error: &str,
        attempts: u32,
    ) -> Result<(), ProgressError> {
        self.record(ProgressRecord::Failed(FailedJob {
            name: name.to_string(),
            slug: slug.to_string(),
            error: error.to_string(),
            attempts,
            timestamp: Utc::now(),
        }))
    }

    /// Apply an outcome and persist before returning.
    ///
    /// A name appears in at most one list. A completion clears any earlier
    /// failure for the name; a repeated failure replaces the earlier one and
    /// accumulates its attempt count.
    pub fn record(&mut self, record: ProgressRecord) -> Result<(), ProgressError> {
        match record {
            ProgressRecord::Completed(job) => {
                self.state.failed.retain(|f| f.name != job.name);
                self.state.completed.retain(|c| c.name != job.name);
                self.state.completed.push(job);
            }
            ProgressRecord::Failed(mut job) => {
                if self.is_completed(&job.name) {
                    warn!(
                        "Ignoring failure for {}: already completed in a previous run",
                        job.name
                    );
                    return Ok(());
                }
                if let Some(pos) = self.state.failed.iter().position(|f| f.name == job.name) {
                    let previous = self.state.failed.remove(pos);
                    job.attempts += previous.attempts;
                }
                self.state.failed.push(job);
            }
        }
        self.persist()
    }

    /// Persist the index of the batch currently being processed.
    pub fn set_current_batch(&mut self, index: usize) -> Result<(), ProgressError> {
        self.state.current_batch_index = index;
        self.persist()
    }

    /// Whether `name` has a completed record.
    pub fn is_completed(&self, name: &str) -> bool {
        self.state.completed.iter().any(|c| c.name == name)
    }

    /// Name of the ledger entry whose normalized form matches `name`, if any.
    ///
    /// Completed entries win over failed ones.
    pub fn recorded_name(&self, name: &str) -> Option<&str> {
        let wanted = normalize_title(name);
        self.state
            .completed
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.state.failed.iter().map(|f| f.name.as_str()))
            .find(|recorded| normalize_title(recorded) == wanted)
    }

    /// The recorded outcome for `name`, if any.
    pub fn outcome(&self, name: &str) -> Option<ProgressRecord> {
        self.state
            .completed
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .map(ProgressRecord::Completed)
            .or_else(|| {
                self.state
                    .failed
                    .iter()
                    .find(|f| f.name == name)
                    .cloned()
                    .map(ProgressRecord::Failed)
            })
    }

    /// Aggregate counts.
    pub fn summary(&self) -> ProgressSummary {
        self.state.summary()
    }

    fn persist(&mut self) -> Result<(), ProgressError> {
        self.state.last_updated_at = Utc::now();
        let json = serde_json::to_vec_pretty(&self.state)?;

        let io_err = |source: std::io::Error| ProgressError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp_path = self.tmp_path();
        let mut file = File::create(&tmp_path).map_err(io_err)?;
        file.write_all(&json).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn quarantine(path: &Path) {
        let mut name = path.as_os_str().to_owned();
        name.push(".corrupt");
        let target = PathBuf::from(name);
        if let Err(e) = fs::rename(path, &target) {
            warn!("Failed to move corrupt progress file aside: {}", e);
        } else {
            info!("Moved corrupt progress file to {}", target.display());
        }
    }
}
