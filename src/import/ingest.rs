use super::error::ImportError;
use std::path::PathBuf;

const UTF8_BOM: &str = "\u{feff}";

/// Where the import text comes from: a file the user picked, or text the
/// host already read on its side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportSource {
    Path(PathBuf),
    Inline(String),
}

impl ImportSource {
    /// `None` means nothing was selected, which is a no-op rather than an error.
    pub fn select(in_path: Option<&str>, text: Option<&str>) -> Option<Self> {
        if let Some(p) = in_path.map(str::trim).filter(|p| !p.is_empty()) {
            return Some(Self::Path(PathBuf::from(p)));
        }
        text.filter(|t| !t.is_empty())
            .map(|t| Self::Inline(t.to_string()))
    }

    pub fn label(&self) -> String {
        match self {
            Self::Path(p) => p.to_string_lossy().to_string(),
            Self::Inline(_) => "<inline>".to_string(),
        }
    }
}

pub fn read_source(source: &ImportSource) -> Result<String, ImportError> {
    let text = match source {
        ImportSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|e| ImportError::Ingest {
                source_name: source.label(),
                message: e.to_string(),
            })?;
            String::from_utf8(bytes).map_err(|_| ImportError::Ingest {
                source_name: source.label(),
                message: "file is not valid UTF-8".to_string(),
            })?
        }
        ImportSource::Inline(text) => text.clone(),
    };
    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
