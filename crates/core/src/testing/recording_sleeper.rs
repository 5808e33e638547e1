//! Sleeper that records requested durations instead of waiting.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clock::Sleeper;

/// Fake sleeper for testing poll intervals, backoff, and batch cooldowns.
///
/// Every `sleep` returns immediately after recording its duration.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    recorded: Arc<RwLock<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in order.
    pub async fn recorded(&self) -> Vec<Duration> {
        self.recorded.read().await.clone()
    }

    /// Total virtual time slept.
    pub async fn total(&self) -> Duration {
        self.recorded.read().await.iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.recorded.write().await.push(duration);
        tokio::task::yield_now().await;
    }
}
