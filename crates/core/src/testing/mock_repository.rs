//! Mock content repository for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::repository::{
    normalize_title, RecordHandle, RecordRepository, RepositoryError,
};

/// Mock implementation of the RecordRepository trait.
///
/// Records are registered up front with [`add_record`](Self::add_record);
/// lookups use the same normalized title match as the real client.
#[derive(Debug, Clone)]
pub struct MockRepository {
    records: Arc<RwLock<Vec<RecordHandle>>>,
    lookups: Arc<RwLock<Vec<String>>>,
    updates: Arc<RwLock<Vec<(String, String)>>>,
    failing_updates: Arc<RwLock<HashSet<String>>>,
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
            updates: Arc::new(RwLock::new(Vec::new())),
            failing_updates: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Register a record.
    pub async fn add_record(&self, id: impl Into<String>, title: impl Into<String>) {
        self.records.write().await.push(RecordHandle {
            id: id.into(),
            title: title.into(),
        });
    }

    /// Make write-backs to this record id fail.
    pub async fn fail_updates_for(&self, record_id: impl Into<String>) {
        self.failing_updates.write().await.insert(record_id.into());
    }

    /// Titles looked up, in order.
    pub async fn lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }

    /// Successful `(record_id, url)` write-backs, in order.
    pub async fn updates(&self) -> Vec<(String, String)> {
        self.updates.read().await.clone()
    }

    pub async fn update_count(&self) -> usize {
        self.updates.read().await.len()
    }
}

#[async_trait]
impl RecordRepository for MockRepository {
    fn name(&self) -> &str {
        "mock"
    }

    async fn find_by_title(&self, title: &str) -> Result<RecordHandle, RepositoryError> {
        self.lookups.write().await.push(title.to_string());
        let wanted = normalize_title(title);
        self.records
            .read()
            .await
            .iter()
            .find(|r| normalize_title(&r.title) == wanted)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(title.to_string()))
    }

    async fn update_artifact_url(
        &self,
        record_id: &str,
        url: &str,
    ) -> Result<(), RepositoryError> {
        if self.failing_updates.read().await.contains(record_id) {
            return Err(RepositoryError::Api {
                status: 503,
                message: "mock write-back failure".to_string(),
            });
        }
        self.updates
            .write()
            .await
            .push((record_id.to_string(), url.to_string()));
        Ok(())
    }
}
