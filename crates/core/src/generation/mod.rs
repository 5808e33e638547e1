//! Generation service integration.
//!
//! [`GenerationService`] is the raw transport (submit, status, content).
//! [`GenerationClient`] drives one job through the service's state machine:
//!
//! ```text
//! Submitted -> {Queued, Processing}* -> {Completed | Failed | TimedOut}
//! ```
//!
//! with bounded polling and whole-attempt retry with exponential backoff.

mod client;
mod config;
mod openai;
mod traits;
mod types;

pub use client::GenerationClient;
pub use config::GenerationConfig;
pub use openai::OpenAiVideoService;
pub use traits::GenerationService;
pub use types::{
    GeneratedArtifact, GenerationError, GenerationJob, GenerationPolicy, GenerationStatus,
    JobStatusReport,
};
