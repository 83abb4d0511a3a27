use super::error::{ImportError, RowRejection};
use super::normalize::Candidate;
use crate::session::SessionProvider;
use crate::store::RowStore;
use crate::student::StudentRecord;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// What to do with candidates that fail row validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidRowPolicy {
    /// Any invalid row blocks the whole import.
    #[default]
    RejectBatch,
    /// Invalid rows are reported and left out; the rest is imported.
    SkipInvalid,
}

impl InvalidRowPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject_batch" => Some(Self::RejectBatch),
            "skip_invalid" => Some(Self::SkipInvalid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RejectBatch => "reject_batch",
            Self::SkipInvalid => "skip_invalid",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistOutcome {
    pub imported: usize,
    pub skipped: Vec<RowRejection>,
}

fn row_errors(c: &Candidate) -> Vec<RowRejection> {
    c.record
        .validate()
        .into_iter()
        .filter(|i| i.is_error())
        .map(|i| RowRejection {
            line: c.line,
            field: Some(i.field.to_string()),
            message: i.message,
        })
        .collect()
}

fn distinct_lines(rows: &[RowRejection]) -> usize {
    rows.iter().map(|r| r.line).collect::<BTreeSet<_>>().len()
}

/// Validates, stamps the session owner on every record and hands the batch to
/// the store in a single call.
///
/// Fails closed: without a session user the store is never touched. A store
/// rejection is reported with the store's own message and nothing is kept.
pub fn persist_batch(
    session: &dyn SessionProvider,
    store: &mut dyn RowStore,
    candidates: &[Candidate],
    policy: InvalidRowPolicy,
) -> Result<PersistOutcome, ImportError> {
    if candidates.is_empty() {
        return Err(ImportError::NothingToImport);
    }
    let Some(user) = session.current_user() else {
        return Err(ImportError::Auth);
    };

    let mut rejected = Vec::new();
    let mut accepted: Vec<&Candidate> = Vec::new();
    for c in candidates {
        let errors = row_errors(c);
        if errors.is_empty() {
            accepted.push(c);
        } else {
            rejected.extend(errors);
        }
    }

    if !rejected.is_empty() {
        let bad = distinct_lines(&rejected);
        match policy {
            InvalidRowPolicy::RejectBatch => {
                warn!(invalid = bad, total = candidates.len(), "import rejected before store");
                return Err(ImportError::Persist {
                    message: format!(
                        "{bad} of {} rows are invalid; nothing was imported",
                        candidates.len()
                    ),
                    rows: rejected,
                });
            }
            InvalidRowPolicy::SkipInvalid if accepted.is_empty() => {
                return Err(ImportError::Persist {
                    message: "no valid rows to import".to_string(),
                    rows: rejected,
                });
            }
            InvalidRowPolicy::SkipInvalid => {}
        }
    }

    let batch = accepted
        .iter()
        .map(|c| StudentRecord {
            owner_id: Some(user.id.clone()),
            ..c.record.clone()
        })
        .collect::<Vec<_>>();

    match store.bulk_insert(&batch) {
        Ok(imported) => {
            info!(imported, skipped = distinct_lines(&rejected), owner = %user.id, "students imported");
            Ok(PersistOutcome {
                imported,
                skipped: rejected,
            })
        }
        Err(e) => {
            warn!(error = %e, "store rejected import batch");
            let rows = e
                .row
                .and_then(|i| accepted.get(i))
                .map(|c| {
                    vec![RowRejection {
                        line: c.line,
                        field: None,
                        message: e.message.clone(),
                    }]
                })
                .unwrap_or_default();
            Err(ImportError::Persist {
                message: e.message,
                rows,
            })
        }
    }
}
