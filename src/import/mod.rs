//! Bulk student import: ingest → normalize → (preview, confirm) → persist.

mod error;
mod ingest;
mod normalize;
mod persist;

pub use error::{ErrorKind, ImportError};
pub use ingest::{read_source, ImportSource};
pub use normalize::{normalize_csv, Candidate, CsvDialect, NormalizedCsv};
pub use persist::{persist_batch, InvalidRowPolicy};

use serde_json::{json, Value};

pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

/// Candidates held between preview and confirmation. Only the first
/// `limit` rows are rendered; the whole set is kept for persistence.
#[derive(Clone, Debug)]
pub struct ImportPreview {
    pub source: String,
    pub dialect: CsvDialect,
    pub csv: NormalizedCsv,
}

impl ImportPreview {
    pub fn build(source: &ImportSource, dialect: CsvDialect) -> Result<Self, ImportError> {
        let text = read_source(source)?;
        let csv = normalize_csv(&text, dialect)?;
        Ok(Self {
            source: source.label(),
            dialect,
            csv,
        })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.csv.candidates
    }

    pub fn total(&self) -> usize {
        self.csv.candidates.len()
    }

    pub fn to_json(&self, limit: usize) -> Value {
        let rows = self
            .csv
            .candidates
            .iter()
            .take(limit)
            .map(|c| {
                let r = &c.record;
                json!({
                    "line": c.line,
                    "displayName": r.display_name(),
                    "email": r.email,
                    "gradeLevel": r.grade_level,
                    "studentId": r.student_id,
                    "record": r,
                })
            })
            .collect::<Vec<_>>();
        let mut issues = Vec::new();
        let mut invalid = 0;
        for c in &self.csv.candidates {
            let found = c.record.validate();
            if found.iter().any(|i| i.is_error()) {
                invalid += 1;
            }
            issues.extend(found.into_iter().map(|i| {
                json!({
                    "line": c.line,
                    "field": i.field,
                    "severity": i.severity,
                    "message": i.message,
                })
            }));
        }

        json!({
            "source": self.source,
            "dialect": self.dialect.as_str(),
            "headers": self.csv.headers,
            "unknownHeaders": self.csv.unknown_headers(),
            "total": self.total(),
            "shown": rows.len(),
            "truncated": self.total() > rows.len(),
            "invalid": invalid,
            "rows": rows,
            "issues": issues,
        })
    }
}
