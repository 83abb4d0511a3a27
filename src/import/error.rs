use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Ingest,
    Format,
    Auth,
    Persist,
    NothingToImport,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Ingest => "ingest_failed",
            Self::Format => "format_invalid",
            Self::Auth => "not_authenticated",
            Self::Persist => "persist_failed",
            Self::NothingToImport => "no_preview",
        }
    }
}

/// One rejected input row, addressed by its physical line in the file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRejection {
    pub line: usize,
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {source_name}: {message}")]
    Ingest {
        source_name: String,
        message: String,
    },

    #[error("{0}")]
    Format(String),

    #[error("Not authenticated")]
    Auth,

    #[error("{message}")]
    Persist {
        message: String,
        rows: Vec<RowRejection>,
    },

    #[error("No students to import")]
    NothingToImport,
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ingest { .. } => ErrorKind::Ingest,
            Self::Format(_) => ErrorKind::Format,
            Self::Auth => ErrorKind::Auth,
            Self::Persist { .. } => ErrorKind::Persist,
            Self::NothingToImport => ErrorKind::NothingToImport,
        }
    }

    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Ingest { source_name, .. } => Some(json!({ "source": source_name })),
            Self::Persist { rows, .. } if !rows.is_empty() => Some(json!({ "rows": rows })),
            _ => None,
        }
    }
}
