pub mod export;

pub use export::{export_track_csv, MAX_EXPORT_FPS};

use crate::core::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from reading or writing tactic files
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tactic JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("tactic has no steps")]
    EmptyTimeline,
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// A saved tactic: a name and its keyframes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl TacticDocument {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            saved_at: None,
            steps,
        }
    }

    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load a tactic from disk
pub fn load_document<P: AsRef<Path>>(path: P) -> DocumentResult<TacticDocument> {
    let json = std::fs::read_to_string(path)?;
    TacticDocument::from_json(&json)
}

/// Write a tactic to disk, stamping the save time
pub fn save_document<P: AsRef<Path>>(path: P, document: &TacticDocument) -> DocumentResult<()> {
    let mut document = document.clone();
    document.saved_at = Some(Utc::now());

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, document.to_json()?)?;
    Ok(())
}
