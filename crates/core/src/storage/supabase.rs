//! Supabase Storage implementation of [`ArtifactStore`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, info};

use super::config::StorageConfig;
use super::error::StorageError;
use super::object_key;
use super::traits::ArtifactStore;

/// Supabase Storage REST client.
pub struct SupabaseStorage {
    client: Client,
    config: StorageConfig,
}

#[derive(Debug, Serialize)]
struct CreateBucketRequest<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
}

impl SupabaseStorage {
    /// Create a new storage client.
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.service_key)
            .header("apikey", &self.config.service_key)
    }

    /// Public URL of the object stored for `slug`.
    pub fn public_url(&self, slug: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url(),
            urlencoding::encode(&self.config.bucket),
            urlencoding::encode(&object_key(slug, &self.config.extension))
        )
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url(),
            urlencoding::encode(&self.config.bucket),
            urlencoding::encode(key)
        )
    }
}

/// Whether a bucket-create response means the bucket is already there.
fn is_already_exists(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::CONFLICT {
        return true;
    }
    let body = body.to_lowercase();
    body.contains("already exists") || body.contains("duplicate")
}

#[async_trait]
impl ArtifactStore for SupabaseStorage {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn ensure_container_exists(&self) -> Result<(), StorageError> {
        let url = format!("{}/storage/v1/bucket", self.base_url());
        let request = CreateBucketRequest {
            id: &self.config.bucket,
            name: &self.config.bucket,
            public: self.config.public,
        };

        let response = self
            .authorized(self.client.post(&url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Created storage bucket {}", self.config.bucket);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if is_already_exists(status, &body) {
            debug!("Storage bucket {} already exists", self.config.bucket);
            return Ok(());
        }

        Err(StorageError::Container {
            bucket: self.config.bucket.clone(),
            status: status.as_u16(),
            message: body,
        })
    }

    async fn upload(&self, local_path: &Path, slug: &str) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|source| StorageError::Io {
                path: local_path.to_path_buf(),
                source,
            })?;

        let key = object_key(slug, &self.config.extension);
        debug!("Uploading {} ({} bytes) to bucket {}", key, bytes.len(), self.config.bucket);

        let response = self
            .authorized(self.client.post(self.object_url(&key)))
            .header(CONTENT_TYPE, &self.config.content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload {
                key,
                status: status.as_u16(),
                message: body,
            });
        }

        let url = self.public_url(slug);
        info!("Uploaded {} -> {}", key, url);
        Ok(url)
    }
}
