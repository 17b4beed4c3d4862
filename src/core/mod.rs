//! # Core Module
//!
//! The front-end-agnostic batch engine.
//!
//! ## Modules
//! - `catalog` - Loads the ordered list of locations
//! - `progress` - Persists which locations are done
//! - `source` - Lists source folders and their images
//! - `batch` - Plans the next batch and materializes folders
//! - `runner` - Orchestrates a full run

pub mod batch;
pub mod catalog;
pub mod progress;
pub mod runner;
pub mod source;

// Re-export commonly used types
pub use batch::{BatchPlan, LocationOutcome, PlannedLocation};
pub use catalog::LocationCatalog;
pub use progress::{ProcessedSet, ProgressStore};
pub use runner::{BatchRunner, RunOutcome, RunSummary};
pub use source::{SourcePool, SourceScanner};
