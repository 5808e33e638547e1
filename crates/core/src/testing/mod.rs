//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of all external service traits,
//! allowing the orchestrator and recovery tool to be exercised end to end
//! without real infrastructure or real waiting.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelforge_core::testing::{MockArtifactStore, MockGenerationService, MockRepository};
//!
//! let service = MockGenerationService::new();
//! let storage = MockArtifactStore::new();
//! let repository = MockRepository::new();
//!
//! repository.add_record("rec-1", "Registered Nurse").await;
//! storage.fail_uploads_for("welder").await;
//! ```

mod mock_generation;
mod mock_repository;
mod mock_storage;
mod recording_sleeper;

pub use mock_generation::{MockGenerationService, MockPoll};
pub use mock_repository::MockRepository;
pub use mock_storage::{MockArtifactStore, RecordedUpload};
pub use recording_sleeper::RecordingSleeper;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::source::JobDescriptor;

    /// A job with a prompt derived from its name.
    pub fn job(name: &str) -> JobDescriptor {
        JobDescriptor::new(name, format!("A day in the life of a {}", name.to_lowercase()))
    }

    /// Jobs for each name, in order.
    pub fn jobs(names: &[&str]) -> Vec<JobDescriptor> {
        names.iter().map(|name| job(name)).collect()
    }

    /// CSV source text for the given names.
    pub fn csv_source(names: &[&str]) -> String {
        let mut csv = String::from("name,prompt\n");
        for job in jobs(names) {
            csv.push_str(&format!("{},\"{}\"\n", job.name, job.prompt));
        }
        csv
    }
}
