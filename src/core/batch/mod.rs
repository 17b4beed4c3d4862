//! Batch planning and materialization.
//!
//! Selects the next unprocessed locations, pairs each with a source folder
//! (cycling through the pool) and turns the plan into folders on disk.

mod executor;
mod planner;
mod types;

pub use executor::FolderMaterializer;
pub use planner::{sanitize_folder_name, BatchPlanner};
pub use types::*;
