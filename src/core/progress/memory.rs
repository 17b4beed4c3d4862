//! In-memory progress backend for testing and dry runs.

use super::{ProcessedSet, ProgressStore};
use crate::error::ProgressError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory progress backend
pub struct InMemoryProgressStore {
    processed: RwLock<ProcessedSet>,
    updated_at: RwLock<Option<DateTime<Utc>>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::with_processed(ProcessedSet::new())
    }

    /// Start from an existing set, as if loaded from a previous run
    pub fn with_processed(processed: ProcessedSet) -> Self {
        Self {
            processed: RwLock::new(processed),
            updated_at: RwLock::new(None),
        }
    }

    fn memory_path() -> PathBuf {
        PathBuf::from("memory")
    }

    fn poisoned() -> ProgressError {
        ProgressError::Persist {
            path: Self::memory_path(),
            reason: "lock poisoned".to_string(),
        }
    }
}

impl Default for InMemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn load(&self) -> Result<ProcessedSet, ProgressError> {
        let processed = self.processed.read().map_err(|_| Self::poisoned())?;
        Ok(processed.clone())
    }

    fn save(&self, processed: &ProcessedSet) -> Result<(), ProgressError> {
        let mut stored = self.processed.write().map_err(|_| Self::poisoned())?;
        *stored = processed.clone();

        let mut updated_at = self.updated_at.write().map_err(|_| Self::poisoned())?;
        *updated_at = Some(Utc::now());
        Ok(())
    }

    fn last_updated(&self) -> Result<Option<DateTime<Utc>>, ProgressError> {
        let updated_at = self.updated_at.read().map_err(|_| Self::poisoned())?;
        Ok(*updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_given_set() {
        let store = InMemoryProgressStore::with_processed(["A"].into_iter().collect());
        assert!(store.load().unwrap().contains("A"));
        assert!(store.last_updated().unwrap().is_none());
    }

    #[test]
    fn save_replaces_contents() {
        let store = InMemoryProgressStore::new();
        store.save(&["B", "C"].into_iter().collect()).unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
        assert!(store.last_updated().unwrap().is_some());
    }
}
