//! Types for the batch module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::source::SourceEntry;
use crate::events::BatchRange;

/// A catalog location chosen for this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub location: String,
    /// Position in the catalog
    pub catalog_index: usize,
}

/// Outcome of batch selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSelection {
    /// Every catalog location is already processed
    AllProcessed,
    /// The next locations to handle, in catalog order (may be empty for a batch size of 0)
    Batch(Vec<SelectedLocation>),
}

/// Fewer images were available than requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionShortfall {
    pub requested: usize,
    pub available: usize,
}

/// Everything needed to materialize one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLocation {
    pub location: String,
    pub catalog_index: usize,
    /// Sanitized destination folder name
    pub folder_name: String,
    /// Source folder name within the pool
    pub source_folder: String,
    pub source_path: PathBuf,
    /// Images to copy, in source order
    pub images: Vec<SourceEntry>,
    pub shortfall: Option<SelectionShortfall>,
}

/// The work for one run (never persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPlan {
    pub id: String,
    pub locations: Vec<PlannedLocation>,
    pub images_per_folder: usize,
    pub range: Option<BatchRange>,
}

impl BatchPlan {
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Number of locations that will receive fewer images than requested
    pub fn shortfall_count(&self) -> usize {
        self.locations
            .iter()
            .filter(|l| l.shortfall.is_some())
            .count()
    }
}

/// A single image that failed to copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCopyFailure {
    pub image: String,
    pub message: String,
}

/// What happened to one planned location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocationOutcome {
    /// Folder created and images copied (some copies may have failed)
    Created {
        folder: PathBuf,
        images_copied: usize,
        failures: Vec<ImageCopyFailure>,
        shortfall: Option<SelectionShortfall>,
    },
    /// Folder was already there; contents untouched
    AlreadyExists { folder: PathBuf },
    /// Folder could not be created; location stays eligible
    CreateFailed { folder: PathBuf, message: String },
}

impl LocationOutcome {
    /// Whether the location ends up recorded as processed
    pub fn marks_processed(&self) -> bool {
        !matches!(self, LocationOutcome::CreateFailed { .. })
    }
}

/// Outcome for one location of the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResult {
    pub location: String,
    pub outcome: LocationOutcome,
}
