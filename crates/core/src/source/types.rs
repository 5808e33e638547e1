//! Types for the prompt source.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::slug::slugify;

/// Errors raised while loading the prompt source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source file could not be opened.
    #[error("failed to open source {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV itself is malformed.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A data row failed validation. `row` is 1-based, excluding the header.
    #[error("row {row}: invalid {field}: {reason}")]
    Validation {
        row: usize,
        field: &'static str,
        reason: String,
    },
}

/// One record's generation request, derived once from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Record name, also the repository title used for lookup.
    pub name: String,
    /// Storage-safe identifier derived from `name`.
    pub slug: String,
    /// Prompt sent to the generation service.
    pub prompt: String,
}

impl JobDescriptor {
    /// Build a descriptor, deriving the slug from the name.
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            name,
            slug,
            prompt: prompt.into(),
        }
    }

    /// Case-insensitive exact name match, used by the `--careers` filter.
    pub fn matches_name(&self, other: &str) -> bool {
        self.name.trim().to_lowercase() == other.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_slug() {
        let job = JobDescriptor::new("Registered Nurse", "A nurse at work");
        assert_eq!(job.slug, "registered-nurse");
        assert_eq!(job.prompt, "A nurse at work");
    }

    #[test]
    fn test_matches_name_ignores_case_and_padding() {
        let job = JobDescriptor::new("Registered Nurse", "prompt");
        assert!(job.matches_name("registered nurse"));
        assert!(job.matches_name("  REGISTERED NURSE "));
        assert!(!job.matches_name("Registered"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = SourceError::Validation {
            row: 3,
            field: "prompt",
            reason: "must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "row 3: invalid prompt: must not be empty");
    }
}
