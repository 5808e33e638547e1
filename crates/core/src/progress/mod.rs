//! Durable progress ledger.
//!
//! The ledger is a single JSON document rewritten in full after every
//! mutation. It is the only source of truth for `--resume`: a job is skipped
//! on resume if and only if its name appears in the `completed` list.
//!
//! Every `record_*` call persists before returning, so a crash can only lose
//! work done between an external side effect and the matching record call.

mod store;
mod types;

pub use store::ProgressStore;
pub use types::{CompletedJob, FailedJob, ProgressError, ProgressRecord, ProgressState, ProgressSummary};
