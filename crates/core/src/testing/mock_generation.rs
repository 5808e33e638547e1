//! Mock generation service for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::generation::{GenerationError, GenerationService, GenerationStatus, JobStatusReport};

/// One scripted status poll response.
#[derive(Debug, Clone)]
pub enum MockPoll {
    /// The service answers with this report.
    Report(JobStatusReport),
    /// The poll fails at the transport level.
    Transport(String),
}

impl MockPoll {
    pub fn queued() -> Self {
        Self::Report(JobStatusReport::new(GenerationStatus::Queued, 0))
    }

    pub fn processing(progress_percent: u8) -> Self {
        Self::Report(JobStatusReport::new(
            GenerationStatus::Processing,
            progress_percent,
        ))
    }

    pub fn completed() -> Self {
        Self::Report(JobStatusReport::new(GenerationStatus::Completed, 100))
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Report(JobStatusReport::failed(detail))
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

#[derive(Debug, Default)]
struct State {
    submitted: Vec<String>,
    status_calls: Vec<String>,
    content_calls: Vec<String>,
    next_id: u32,
    submit_failure: Option<String>,
    failing_prompts: HashSet<String>,
    download_failure: Option<String>,
    polls: VecDeque<MockPoll>,
    fixed_statuses: HashMap<String, JobStatusReport>,
    content: Vec<u8>,
}

/// Mock implementation of the GenerationService trait.
///
/// Provides controllable behavior for testing:
/// - Record every submit/status/content call
/// - Script the sequence of status poll responses
/// - Simulate submission and download failures
///
/// Unscripted polls report `Completed`, so by default every job finishes on
/// its first poll.
///
/// # Example
///
/// ```rust,ignore
/// let service = MockGenerationService::new();
/// service.queue_polls(vec![MockPoll::processing(50), MockPoll::completed()]).await;
///
/// let job_id = service.submit("a welder at work").await?;
/// assert_eq!(service.submit_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockGenerationService {
    state: Arc<RwLock<State>>,
}

impl Default for MockGenerationService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerationService {
    /// Create a new mock service returning a small fake artifact.
    pub fn new() -> Self {
        let state = State {
            content: b"mock-video-bytes".to_vec(),
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Make every submission fail with a transport error.
    pub async fn fail_submissions(&self, message: impl Into<String>) {
        self.state.write().await.submit_failure = Some(message.into());
    }

    /// Make submissions of this exact prompt fail.
    pub async fn fail_prompt(&self, prompt: impl Into<String>) {
        self.state.write().await.failing_prompts.insert(prompt.into());
    }

    /// Make every content download fail.
    pub async fn fail_downloads(&self, message: impl Into<String>) {
        self.state.write().await.download_failure = Some(message.into());
    }

    /// Append scripted poll responses, consumed in order across all jobs.
    pub async fn queue_polls(&self, polls: Vec<MockPoll>) {
        self.state.write().await.polls.extend(polls);
    }

    /// Pin the status reported for a specific job id (e.g. a job created
    /// by an earlier, crashed run).
    pub async fn set_job_status(&self, job_id: impl Into<String>, report: JobStatusReport) {
        self.state
            .write()
            .await
            .fixed_statuses
            .insert(job_id.into(), report);
    }

    /// Set the artifact bytes returned by `content`.
    pub async fn set_content(&self, content: Vec<u8>) {
        self.state.write().await.content = content;
    }

    /// Prompts submitted, in order (failed submissions included).
    pub async fn submitted_prompts(&self) -> Vec<String> {
        self.state.read().await.submitted.clone()
    }

    pub async fn submit_count(&self) -> usize {
        self.state.read().await.submitted.len()
    }

    pub async fn status_count(&self) -> usize {
        self.state.read().await.status_calls.len()
    }

    pub async fn content_count(&self) -> usize {
        self.state.read().await.content_calls.len()
    }

    /// Job ids whose content was requested, in order.
    pub async fn downloaded_jobs(&self) -> Vec<String> {
        self.state.read().await.content_calls.clone()
    }
}

#[async_trait]
impl GenerationService for MockGenerationService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut state = self.state.write().await;
        state.submitted.push(prompt.to_string());

        if let Some(message) = &state.submit_failure {
            return Err(GenerationError::Transport(message.clone()));
        }
        if state.failing_prompts.contains(prompt) {
            return Err(GenerationError::Api {
                status: 500,
                message: format!("mock failure for prompt '{}'", prompt),
            });
        }

        state.next_id += 1;
        Ok(format!("video_{:04}", state.next_id))
    }

    async fn status(&self, job_id: &str) -> Result<JobStatusReport, GenerationError> {
        let mut state = self.state.write().await;
        state.status_calls.push(job_id.to_string());

        if let Some(report) = state.fixed_statuses.get(job_id) {
            return Ok(report.clone());
        }

        match state.polls.pop_front() {
            Some(MockPoll::Report(report)) => Ok(report),
            Some(MockPoll::Transport(message)) => Err(GenerationError::Transport(message)),
            None => Ok(JobStatusReport::new(GenerationStatus::Completed, 100)),
        }
    }

    async fn content(&self, job_id: &str) -> Result<Vec<u8>, GenerationError> {
        let mut state = self.state.write().await;
        state.content_calls.push(job_id.to_string());

        if let Some(message) = &state.download_failure {
            return Err(GenerationError::Transport(message.clone()));
        }
        Ok(state.content.clone())
    }
}
