pub mod clock;
pub mod config;
pub mod generation;
pub mod orchestrator;
pub mod progress;
pub mod recovery;
pub mod repository;
pub mod source;
pub mod storage;
pub mod testing;

pub use clock::{Sleeper, TokioSleeper};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ProgressConfig,
    SanitizedConfig, SourceConfig,
};
pub use generation::{
    GeneratedArtifact, GenerationClient, GenerationConfig, GenerationError, GenerationPolicy,
    GenerationService, GenerationStatus, JobStatusReport, OpenAiVideoService,
};
pub use orchestrator::{
    BatchOrchestrator, OrchestratorError, RunConfig, RunOptions, RunReport,
};
pub use progress::{ProgressError, ProgressState, ProgressStore, ProgressSummary};
pub use recovery::{RecoveryError, RecoveryOutcome, RecoveryRequest, RecoveryTool};
pub use repository::{
    RecordHandle, RecordRepository, RepositoryConfig, RepositoryError, RestRepository,
};
pub use source::{slugify, JobDescriptor, SourceError};
pub use storage::{ArtifactStore, StorageConfig, StorageError, SupabaseStorage};
