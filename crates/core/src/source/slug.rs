//! Slugify record names for use as ledger and storage keys.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-z0-9]+").expect("valid slug pattern"));

/// Convert a record name into a lowercase, hyphen-separated slug.
///
/// Runs of characters outside `[a-z0-9]` collapse to a single `-` and
/// leading/trailing separators are trimmed. The result is stable across
/// runs and idempotent: `slugify(&slugify(x)) == slugify(x)`.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
