//! # Progress Module
//!
//! Remembers which locations have been materialized so that repeated runs
//! resume instead of redoing work.
//!
//! ## Backends
//! - `JsonProgressStore` - `{"processed_locations": [...]}` on disk, written atomically
//! - `InMemoryProgressStore` - For testing and dry runs
//!
//! Only one process is expected to use a given state file at a time; there
//! is no locking between concurrent runs.

mod json;
mod memory;
mod traits;

pub use json::JsonProgressStore;
pub use memory::InMemoryProgressStore;
pub use traits::ProgressStore;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Set of processed location identifiers.
///
/// Insertion order is kept so the state file lists locations in the order
/// they were processed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ProcessedSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a location processed. Returns false if it already was.
    pub fn insert(&mut self, location: impl Into<String>) -> bool {
        let location = location.into();
        if self.members.contains(&location) {
            return false;
        }
        self.members.insert(location.clone());
        self.order.push(location);
        true
    }

    pub fn contains(&self, location: &str) -> bool {
        self.members.contains(location)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Locations in the order they were marked
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl PartialEq for ProcessedSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for ProcessedSet {}

impl From<Vec<String>> for ProcessedSet {
    fn from(locations: Vec<String>) -> Self {
        locations.into_iter().collect()
    }
}

impl From<ProcessedSet> for Vec<String> {
    fn from(set: ProcessedSet) -> Self {
        set.order
    }
}

impl FromIterator<String> for ProcessedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = ProcessedSet::new();
        for location in iter {
            set.insert(location);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for ProcessedSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}
