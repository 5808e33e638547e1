//! Content repository integration: resolve a record by title and write the
//! artifact URL back to it.

mod config;
mod rest;
mod types;

pub use config::RepositoryConfig;
pub use rest::RestRepository;
pub use types::{normalize_title, RecordHandle, RecordRepository, RepositoryError};
