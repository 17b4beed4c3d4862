//! # Runner Module
//!
//! Orchestrates one batch run.
//!
//! ## Run Stages
//! 1. **Catalog** - Load the ordered list of locations
//! 2. **Progress** - Load the locations processed by earlier runs
//! 3. **Plan** - Select the next batch; stop early if nothing is left
//! 4. **Scan** - List source folders and their images
//! 5. **Materialize** - Create one folder per location and copy images
//! 6. **Save** - Persist progress once, after the whole batch
//!
//! Runs are sequential and single-process. Interrupting a run loses the
//! progress of that batch; folders already created on disk are picked up as
//! "already exists" by the next run.

mod executor;

pub use executor::{BatchRunner, BatchRunnerBuilder};

use crate::core::batch::{BatchPlan, LocationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    /// Locations in the catalog
    pub total_locations: usize,
    /// Catalog locations processed before this run
    pub already_processed: usize,
    /// Locations in this run's batch
    pub batch_size: usize,
    /// Folders newly created
    pub created: usize,
    /// Locations skipped because their folder already existed
    pub skipped_existing: usize,
    /// Locations whose folder could not be created
    pub failed: usize,
    pub images_copied: usize,
    pub image_failures: usize,
    /// Locations that received fewer images than requested
    pub partial_selections: usize,
    /// Locations added to the processed set by this run
    pub newly_processed: usize,
    pub duration_ms: u64,
}

/// Result of [`BatchRunner::run`]
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing left to do; no files were touched
    AllProcessed { total_locations: usize },
    /// A batch was processed and progress saved
    Completed {
        summary: RunSummary,
        results: Vec<LocationResult>,
    },
}

/// Result of [`BatchRunner::preview`]
#[derive(Debug, Clone)]
pub enum PlanPreview {
    AllProcessed { total_locations: usize },
    Planned {
        plan: BatchPlan,
        total_locations: usize,
        already_processed: usize,
    },
}

/// Progress through the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStatus {
    pub total_locations: usize,
    pub processed: usize,
    pub remaining: usize,
    /// Entries in the state file that are not in the catalog
    pub stale_entries: usize,
    /// First location the next run will handle
    pub next_location: Option<String>,
    /// When progress was last saved; `None` before the first run
    pub last_updated: Option<DateTime<Utc>>,
}
