//! Object storage for generated artifacts.
//!
//! Keys are derived only from the job slug, and uploads overwrite, so a
//! retried or re-run upload for the same record lands on the same object and
//! never leaves orphans behind.

mod config;
mod error;
mod supabase;
mod traits;

pub use config::StorageConfig;
pub use error::StorageError;
pub use supabase::SupabaseStorage;
pub use traits::ArtifactStore;

/// Storage key for a slug: `<slug>.<extension>`.
pub fn object_key(slug: &str, extension: &str) -> String {
    format!("{}.{}", slug, extension.trim_start_matches('.'))
}
