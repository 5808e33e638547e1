//! Types for the content repository.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the content repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No record matches the title. Terminal: never retried.
    #[error("no record titled '{0}'")]
    NotFound(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Repository returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A resolved repository record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHandle {
    /// Identifier used for write-back.
    pub id: String,
    /// Title as stored in the repository.
    pub title: String,
}

/// Lookup and write-back against the content repository.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Returns the name of this repository implementation.
    fn name(&self) -> &str;

    /// Find the record whose normalized title equals the normalized `title`.
    async fn find_by_title(&self, title: &str) -> Result<RecordHandle, RepositoryError>;

    /// Set the artifact URL field on a record. Idempotent.
    async fn update_artifact_url(&self, record_id: &str, url: &str)
        -> Result<(), RepositoryError>;
}

/// Normalize a title for comparison: trimmed, inner whitespace collapsed,
/// lowercased.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Registered   Nurse "), "registered nurse");
        assert_eq!(normalize_title("DATA Scientist"), "data scientist");
    }

    #[test]
    fn test_not_found_is_distinct() {
        let err = RepositoryError::NotFound("Astronaut".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no record titled 'Astronaut'");

        let err = RepositoryError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(!err.is_not_found());
    }
}
