//! CSV parsing for the prompt source.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use super::types::{JobDescriptor, SourceError};

const NAME_COLUMN: &str = "name";
const PROMPT_COLUMN: &str = "prompt";

/// Load and parse a CSV source file.
pub fn load(path: &Path) -> Result<Vec<JobDescriptor>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let jobs = parse(file)?;
    info!("Loaded {} jobs from {}", jobs.len(), path.display());
    Ok(jobs)
}

/// Parse CSV with a header row into job descriptors, preserving row order.
///
/// Requires `name` and `prompt` columns (case-insensitive); other columns are
/// ignored. Stops at the first invalid row.
pub fn parse<R: Read>(reader: R) -> Result<Vec<JobDescriptor>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let name_idx = column_index(&headers, NAME_COLUMN)?;
    let prompt_idx = column_index(&headers, PROMPT_COLUMN)?;

    let mut jobs = Vec::new();
    let mut seen_slugs: HashMap<String, usize> = HashMap::new();

    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record?;

        let name = required_field(&record, name_idx, row, NAME_COLUMN)?;
        let prompt = required_field(&record, prompt_idx, row, PROMPT_COLUMN)?;

        let job = JobDescriptor::new(name, prompt);
        if job.slug.is_empty() {
            return Err(SourceError::Validation {
                row,
                field: NAME_COLUMN,
                reason: format!("'{}' contains no letters or digits", job.name),
            });
        }
        if let Some(first_row) = seen_slugs.insert(job.slug.clone(), row) {
            return Err(SourceError::Validation {
                row,
                field: NAME_COLUMN,
                reason: format!(
                    "'{}' collides with row {} (slug '{}')",
                    job.name, first_row, job.slug
                ),
            });
        }

        debug!(row, job = %job.name, slug = %job.slug, "Parsed job");
        jobs.push(job);
    }

    Ok(jobs)
}

fn column_index(headers: &StringRecord, column: &'static str) -> Result<usize, SourceError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
        .ok_or(SourceError::MissingColumn(column))
}

fn required_field(
    record: &StringRecord,
    idx: usize,
    row: usize,
    field: &'static str,
) -> Result<String, SourceError> {
    match record.get(idx).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(SourceError::Validation {
            row,
            field,
            reason: "must not be empty".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_preserves_order_and_slugs() {
        let csv = "name,prompt\nRegistered Nurse,A nurse on rounds\nData Scientist,Charts on a screen\n";
        let jobs = parse(csv.as_bytes()).unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "Registered Nurse");
        assert_eq!(jobs[0].slug, "registered-nurse");
        assert_eq!(jobs[1].name, "Data Scientist");
        assert_eq!(jobs[1].prompt, "Charts on a screen");
    }

    #[test]
    fn test_parse_ignores_extra_columns_and_header_case() {
        let csv = "Category,Name,Description,Prompt\nHealth,Registered Nurse,Cares for patients,\"A nurse, smiling\"\n";
        let jobs = parse(csv.as_bytes()).unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "Registered Nurse");
        assert_eq!(jobs[0].prompt, "A nurse, smiling");
    }

    #[test]
    fn test_parse_fails_fast_on_empty_prompt() {
        let csv = "name,prompt\nNurse,ok\nPlumber,   \nWelder,\n";
        let err = parse(csv.as_bytes()).unwrap_err();

        match err {
            SourceError::Validation { row, field, .. } => {
                assert_eq!(row, 2);
                assert_eq!(field, "prompt");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_fails_on_empty_name() {
        let csv = "name,prompt\n,some prompt\n";
        let err = parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Validation {
                row: 1,
                field: "name",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_fails_on_short_row() {
        let csv = "name,prompt\nNurse\n";
        let err = parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Validation {
                field: "prompt",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_missing_column() {
        let csv = "title,prompt\nNurse,prompt\n";
        let err = parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn("name")));
    }

    #[test]
    fn test_parse_rejects_slug_collision() {
        let csv = "name,prompt\nNurse,a\nC++ Developer,b\nC Developer,c\n";
        let err = parse(csv.as_bytes()).unwrap_err();
        match err {
            SourceError::Validation { row, field, reason } => {
                assert_eq!(row, 3);
                assert_eq!(field, "name");
                assert!(reason.contains("row 2"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_header_only() {
        let jobs = parse("name,prompt\n".as_bytes()).unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "name,prompt").unwrap();
        writeln!(file, "Electrician,Wiring a panel").unwrap();

        let jobs = load(file.path()).unwrap();
        assert_eq!(jobs, vec![JobDescriptor::new("Electrician", "Wiring a panel")]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/careers.csv")).unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }
}
