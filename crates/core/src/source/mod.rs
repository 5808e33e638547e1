//! Prompt source: turns a tabular (CSV) export into an ordered list of jobs.
//!
//! Parsing is fail-fast. The first row with a missing name or prompt aborts
//! the whole load with a [`SourceError::Validation`] naming the row and field,
//! so a run never starts on a partially valid source.

mod parser;
mod slug;
mod types;

pub use parser::{load, parse};
pub use slug::slugify;
pub use types::{JobDescriptor, SourceError};
