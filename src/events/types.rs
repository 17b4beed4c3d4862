//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::runner::RunSummary;

/// All events emitted during a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Run-level events
    Run(RunEvent),
    /// Per-location materialization events
    Materialize(MaterializeEvent),
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    /// Catalog and progress state are loaded
    Started {
        total_locations: usize,
        already_processed: usize,
    },
    /// Moving to a new phase
    PhaseChanged { phase: RunPhase },
    /// The next batch was selected
    BatchPlanned(BatchRange),
    /// Source pool scanned
    SourcesFound { folders: usize },
    /// Progress state written to disk
    ProgressSaved { processed_total: usize },
    /// Nothing left to process
    AllProcessed { total_locations: usize },
    /// Run finished
    Completed { summary: RunSummary },
}

/// Position of the current batch within the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRange {
    /// Number of locations in the batch
    pub count: usize,
    /// Catalog index of the first location in the batch
    pub first_index: usize,
    /// Catalog index of the last location in the batch
    pub last_index: usize,
}

/// Events while materializing one planned location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MaterializeEvent {
    /// Started work on the location at `index` within the batch
    LocationStarted {
        index: usize,
        total: usize,
        location: String,
    },
    /// Destination folder created
    FolderCreated { path: PathBuf },
    /// Destination folder already existed; location marked processed
    FolderExists { folder: String },
    /// Destination folder could not be created; location left for a later run
    FolderCreateFailed { folder: String, message: String },
    /// Source folder chosen for this location
    SourceSelected { source_folder: String },
    /// Fewer images available than requested
    PartialSelection {
        source_folder: String,
        requested: usize,
        available: usize,
    },
    /// One image copied
    ImageCopied { image: String, folder: String },
    /// One image failed to copy; remaining images continue
    ImageCopyFailed {
        image: String,
        folder: String,
        message: String,
    },
    /// Location finished and marked processed
    LocationFinished { location: String, folder: String },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    LoadingCatalog,
    LoadingProgress,
    Planning,
    ScanningSources,
    Materializing,
    SavingProgress,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::LoadingCatalog => write!(f, "Loading catalog"),
            RunPhase::LoadingProgress => write!(f, "Loading progress"),
            RunPhase::Planning => write!(f, "Planning"),
            RunPhase::ScanningSources => write!(f, "Scanning sources"),
            RunPhase::Materializing => write!(f, "Creating folders"),
            RunPhase::SavingProgress => write!(f, "Saving progress"),
        }
    }
}
