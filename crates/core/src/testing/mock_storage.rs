//! Mock artifact store for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{object_key, ArtifactStore, StorageError};

/// A recorded upload for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub slug: String,
    pub local_path: PathBuf,
    pub url: String,
}

/// Callback run after each successful upload, with the slug.
type UploadHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Mock implementation of the ArtifactStore trait.
///
/// Uploads never touch the local file; they are recorded and answered with a
/// deterministic `mock://` URL.
#[derive(Clone)]
pub struct MockArtifactStore {
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    upload_hook: Arc<RwLock<Option<UploadHook>>>,
    failing_slugs: Arc<RwLock<HashSet<String>>>,
    ensure_calls: Arc<RwLock<usize>>,
    ensure_error: Arc<RwLock<Option<String>>>,
    bucket: String,
}

impl fmt::Debug for MockArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockArtifactStore")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl Default for MockArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockArtifactStore {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            upload_hook: Arc::new(RwLock::new(None)),
            failing_slugs: Arc::new(RwLock::new(HashSet::new())),
            ensure_calls: Arc::new(RwLock::new(0)),
            ensure_error: Arc::new(RwLock::new(None)),
            bucket: "mock-bucket".to_string(),
        }
    }

    /// URL returned for a slug's upload.
    pub fn url_for(&self, slug: &str) -> String {
        format!("mock://{}/{}", self.bucket, object_key(slug, "mp4"))
    }

    /// Make uploads for this slug fail.
    pub async fn fail_uploads_for(&self, slug: impl Into<String>) {
        self.failing_slugs.write().await.insert(slug.into());
    }

    /// Make `ensure_container_exists` fail.
    pub async fn fail_ensure(&self, message: impl Into<String>) {
        *self.ensure_error.write().await = Some(message.into());
    }

    /// Run `hook` after every successful upload (e.g. to break the
    /// environment between two steps of a job).
    pub async fn on_upload(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.upload_hook.write().await = Some(Arc::new(hook));
    }

    pub async fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    pub async fn ensure_count(&self) -> usize {
        *self.ensure_calls.read().await
    }
}

#[async_trait]
impl ArtifactStore for MockArtifactStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ensure_container_exists(&self) -> Result<(), StorageError> {
        *self.ensure_calls.write().await += 1;
        match self.ensure_error.read().await.as_ref() {
            Some(message) => Err(StorageError::Container {
                bucket: self.bucket.clone(),
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn upload(&self, local_path: &Path, slug: &str) -> Result<String, StorageError> {
        if self.failing_slugs.read().await.contains(slug) {
            return Err(StorageError::Upload {
                key: object_key(slug, "mp4"),
                status: 500,
                message: "mock upload failure".to_string(),
            });
        }

        let url = self.url_for(slug);
        self.uploads.write().await.push(RecordedUpload {
            slug: slug.to_string(),
            local_path: local_path.to_path_buf(),
            url: url.clone(),
        });

        let hook = self.upload_hook.read().await.clone();
        if let Some(hook) = hook {
            hook(slug);
        }
        Ok(url)
    }
}
