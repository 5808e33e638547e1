//! OpenAI videos API implementation of [`GenerationService`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::GenerationConfig;
use super::traits::GenerationService;
use super::types::{GenerationError, GenerationStatus, JobStatusReport};

/// Client for the `/videos` endpoints.
pub struct OpenAiVideoService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    seconds: u32,
    size: String,
}

impl OpenAiVideoService {
    /// Create a new service client.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            seconds: config.seconds,
            size: config.size.clone(),
        })
    }

    fn video_url(&self, job_id: &str) -> String {
        format!(
            "{}/videos/{}",
            self.base_url,
            urlencoding::encode(job_id)
        )
    }

    async fn check(response: Response) -> Result<Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GenerationError::Api {
            status: status.as_u16(),
            message: body.chars().take(500).collect(),
        })
    }
}

fn transport(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Transport("request timed out".to_string())
    } else {
        GenerationError::Transport(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct CreateVideoRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    seconds: String,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct VideoObject {
    id: String,
    status: String,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    error: Option<VideoError>,
}

#[derive(Debug, Deserialize)]
struct VideoError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl VideoError {
    fn detail(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

fn parse_status(raw: &str) -> Result<GenerationStatus, GenerationError> {
    match raw {
        "queued" => Ok(GenerationStatus::Queued),
        "in_progress" | "processing" => Ok(GenerationStatus::Processing),
        "completed" => Ok(GenerationStatus::Completed),
        "failed" | "cancelled" => Ok(GenerationStatus::Failed),
        other => Err(GenerationError::Parse(format!(
            "unknown video status '{}'",
            other
        ))),
    }
}

impl TryFrom<VideoObject> for JobStatusReport {
    type Error = GenerationError;

    fn try_from(video: VideoObject) -> Result<Self, Self::Error> {
        let status = parse_status(&video.status)?;
        let progress_percent = match status {
            GenerationStatus::Completed => 100,
            _ => video.progress.unwrap_or(0.0).clamp(0.0, 100.0) as u8,
        };
        let error = match (status, &video.error) {
            (_, Some(err)) => Some(err.detail()),
            (GenerationStatus::Failed, None) => Some(format!("video {} failed", video.id)),
            _ => None,
        };
        Ok(JobStatusReport {
            status,
            progress_percent,
            error,
        })
    }
}

#[async_trait]
impl GenerationService for OpenAiVideoService {
    fn name(&self) -> &str {
        "openai"
    }

    async fn submit(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/videos", self.base_url);
        let request = CreateVideoRequest {
            model: &self.model,
            prompt,
            seconds: self.seconds.to_string(),
            size: &self.size,
        };

        debug!("Submitting video job: model={}, size={}", self.model, self.size);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response).await?;

        let video: VideoObject = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(format!("create video response: {}", e)))?;
        Ok(video.id)
    }

    async fn status(&self, job_id: &str) -> Result<JobStatusReport, GenerationError> {
        let response = self
            .client
            .get(self.video_url(job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response).await?;

        let video: VideoObject = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(format!("video status response: {}", e)))?;
        JobStatusReport::try_from(video)
    }

    async fn content(&self, job_id: &str) -> Result<Vec<u8>, GenerationError> {
        let url = format!("{}/content", self.video_url(job_id));
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::check(response).await?;

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(json: &str) -> VideoObject {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_in_progress() {
        let report = JobStatusReport::try_from(video(
            r#"{"id":"video_1","object":"video","status":"in_progress","progress":37}"#,
        ))
        .unwrap();
        assert_eq!(report.status, GenerationStatus::Processing);
        assert_eq!(report.progress_percent, 37);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_parse_completed_forces_full_progress() {
        let report =
            JobStatusReport::try_from(video(r#"{"id":"video_1","status":"completed"}"#)).unwrap();
        assert_eq!(report.status, GenerationStatus::Completed);
        assert_eq!(report.progress_percent, 100);
    }

    #[test]
    fn test_parse_failed_with_error_detail() {
        let report = JobStatusReport::try_from(video(
            r#"{"id":"video_1","status":"failed","error":{"code":"moderation_blocked","message":"Prompt rejected"}}"#,
        ))
        .unwrap();
        assert_eq!(report.status, GenerationStatus::Failed);
        assert_eq!(
            report.error.as_deref(),
            Some("moderation_blocked: Prompt rejected")
        );
    }

    #[test]
    fn test_parse_failed_without_detail() {
        let report =
            JobStatusReport::try_from(video(r#"{"id":"video_9","status":"failed"}"#)).unwrap();
        assert_eq!(report.error.as_deref(), Some("video video_9 failed"));
    }

    #[test]
    fn test_parse_unknown_status() {
        let err = JobStatusReport::try_from(video(r#"{"id":"v","status":"exploded"}"#))
            .unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)));
    }

    #[test]
    fn test_create_request_shape() {
        let request = CreateVideoRequest {
            model: "sora-2",
            prompt: "a welder at work",
            seconds: 8.to_string(),
            size: "1280x720",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "sora-2");
        assert_eq!(json["seconds"], "8");
        assert_eq!(json["size"], "1280x720");
    }

    #[test]
    fn test_new_trims_base_url() {
        let config: GenerationConfig = toml::from_str(
            r#"
            api_key = "sk-test"
            base_url = "http://localhost:9999/v1/"
        "#,
        )
        .unwrap();
        let service = OpenAiVideoService::new(&config).unwrap();
        assert_eq!(service.video_url("video_1"), "http://localhost:9999/v1/videos/video_1");
        assert_eq!(service.name(), "openai");
    }
}
