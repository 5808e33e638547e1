//! Trait definitions for artifact storage.

use std::path::Path;

use async_trait::async_trait;

use super::error::StorageError;

/// Object storage that publishes artifacts under slug-derived keys.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Returns the name of this storage implementation.
    fn name(&self) -> &str;

    /// Create the container if it does not exist. Safe to call every run.
    async fn ensure_container_exists(&self) -> Result<(), StorageError>;

    /// Upload the file at `local_path` under the key for `slug`, overwriting
    /// any existing object, and return its public URL.
    async fn upload(&self, local_path: &Path, slug: &str) -> Result<String, StorageError>;
}
