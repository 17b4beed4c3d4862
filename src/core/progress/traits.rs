//! Progress store trait definition.

use super::ProcessedSet;
use crate::error::ProgressError;
use chrono::{DateTime, Utc};

/// Trait for progress backends
pub trait ProgressStore: Send + Sync {
    /// Load every location processed so far.
    ///
    /// Returns an empty set on the first run, when nothing has been saved yet.
    fn load(&self) -> Result<ProcessedSet, ProgressError>;

    /// Replace the stored set with `processed`.
    ///
    /// Must never leave a half-written state behind: on failure the previous
    /// state stays readable.
    fn save(&self, processed: &ProcessedSet) -> Result<(), ProgressError>;

    /// Time of the last successful save, if known
    fn last_updated(&self) -> Result<Option<DateTime<Utc>>, ProgressError>;
}
