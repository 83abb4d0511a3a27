use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::import::ImportPreview;
use crate::session::Session;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub session: Session,
    /// Candidates awaiting confirmation; replaced by every new preview.
    pub preview: Option<ImportPreview>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            db: None,
            session: Session::default(),
            preview: None,
        }
    }
}
