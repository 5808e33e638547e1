//! Strapi-style REST implementation of [`RecordRepository`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::config::RepositoryConfig;
use super::types::{normalize_title, RecordHandle, RecordRepository, RepositoryError};

/// REST client for a headless CMS collection.
pub struct RestRepository {
    client: Client,
    config: RepositoryConfig,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<Map<String, Value>>,
}

impl RestRepository {
    /// Create a new repository client.
    pub fn new(config: RepositoryConfig) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.url.trim_end_matches('/'),
            self.config.collection
        )
    }

    async fn check(response: Response) -> Result<Response, RepositoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RepositoryError::Api {
            status: status.as_u16(),
            message: body,
        })
    }
}

/// Identifier used for write-back: `documentId` when present, else `id`.
fn record_id(item: &Map<String, Value>) -> Option<String> {
    match item.get("documentId").or_else(|| item.get("id"))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pick the first item whose normalized title matches `name`.
fn select_record(
    items: &[Map<String, Value>],
    title_field: &str,
    name: &str,
) -> Option<RecordHandle> {
    let wanted = normalize_title(name);
    items.iter().find_map(|item| {
        let title = item.get(title_field)?.as_str()?;
        if normalize_title(title) != wanted {
            return None;
        }
        Some(RecordHandle {
            id: record_id(item)?,
            title: title.to_string(),
        })
    })
}

#[async_trait]
impl RecordRepository for RestRepository {
    fn name(&self) -> &str {
        "rest"
    }

    async fn find_by_title(&self, title: &str) -> Result<RecordHandle, RepositoryError> {
        let filter_key = format!("filters[{}][$eqi]", self.config.title_field);
        debug!("Looking up '{}' in {}", title, self.config.collection);

        let response = self
            .client
            .get(self.collection_url())
            .bearer_auth(&self.config.api_token)
            .query(&[
                (filter_key.as_str(), title.trim()),
                ("pagination[pageSize]", "25"),
            ])
            .send()
            .await?;
        let response = Self::check(response).await?;

        let list: ListResponse = response
            .json()
            .await
            .map_err(|e| RepositoryError::Parse(e.to_string()))?;

        select_record(&list.data, &self.config.title_field, title)
            .ok_or_else(|| RepositoryError::NotFound(title.to_string()))
    }

    async fn update_artifact_url(
        &self,
        record_id: &str,
        url: &str,
    ) -> Result<(), RepositoryError> {
        let endpoint = format!(
            "{}/{}",
            self.collection_url(),
            urlencoding::encode(record_id)
        );
        let field = self.config.artifact_field.as_str();
        let body = json!({ "data": { field: url } });

        let response = self
            .client
            .put(&endpoint)
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;

        debug!(
            "Set {} on {} record {}",
            self.config.artifact_field, self.config.collection, record_id
        );
        Ok(())
    }
}
