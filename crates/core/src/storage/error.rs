//! Error types for artifact storage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing an artifact.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The local artifact could not be read.
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upload was rejected.
    #[error("upload of {key} failed: {status} - {message}")]
    Upload {
        key: String,
        status: u16,
        message: String,
    },

    /// Bucket could not be inspected or created.
    #[error("bucket {bucket} unavailable: {status} - {message}")]
    Container {
        bucket: String,
        status: u16,
        message: String,
    },
}
