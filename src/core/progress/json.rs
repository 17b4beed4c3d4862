//! JSON file progress backend.

use super::{ProcessedSet, ProgressStore};
use crate::error::ProgressError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    processed_locations: ProcessedSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Stores progress as `{"processed_locations": [...], "updated_at": ...}`
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Option<StateDocument>, ProgressError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProgressError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ProgressError::Corrupted {
                path: self.path.clone(),
                source,
            })
    }

    fn persist_error(&self, reason: impl ToString) -> ProgressError {
        ProgressError::Persist {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self) -> Result<ProcessedSet, ProgressError> {
        let processed = self
            .read_document()?
            .map(|doc| doc.processed_locations)
            .unwrap_or_default();

        debug!(
            count = processed.len(),
            path = %self.path.display(),
            "Loaded progress state"
        );
        Ok(processed)
    }

    fn save(&self, processed: &ProcessedSet) -> Result<(), ProgressError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.persist_error(e))?;

        let document = StateDocument {
            processed_locations: processed.clone(),
            updated_at: Some(Utc::now()),
        };

        // Write next to the target so the final rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.persist_error(e))?;
        serde_json::to_writer_pretty(&mut temp, &document).map_err(|e| self.persist_error(e))?;
        temp.write_all(b"\n").map_err(|e| self.persist_error(e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| self.persist_error(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.persist_error(e.error))?;

        debug!(
            count = processed.len(),
            path = %self.path.display(),
            "Saved progress state"
        );
        Ok(())
    }

    fn last_updated(&self) -> Result<Option<DateTime<Utc>>, ProgressError> {
        Ok(self.read_document()?.and_then(|doc| doc.updated_at))
    }
}
