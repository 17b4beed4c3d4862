//! # Catalog Module
//!
//! Loads the ordered list of locations from a JSON document of the form
//! `{"locations": ["Paris", "Berlin", ...]}`. Order is processing priority.

use crate::error::CatalogError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    locations: Vec<String>,
}

/// The full, ordered set of locations for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCatalog {
    locations: Vec<String>,
}

impl LocationCatalog {
    /// Load the catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.is_file() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, CatalogError> {
        let document: CatalogDocument =
            serde_json::from_str(content).map_err(|source| CatalogError::Malformed {
                path: PathBuf::from(path),
                source,
            })?;

        debug!(
            count = document.locations.len(),
            path = %path.display(),
            "Loaded location catalog"
        );

        Ok(Self::from(document.locations))
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl From<Vec<String>> for LocationCatalog {
    fn from(locations: Vec<String>) -> Self {
        Self { locations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_locations_in_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("locations.json");
        fs::write(&path, r#"{"locations": ["Paris", "Berlin", "Rome"]}"#).unwrap();

        let catalog = LocationCatalog::load(&path).unwrap();

        assert_eq!(catalog.locations(), ["Paris", "Berlin", "Rome"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let result = LocationCatalog::load(Path::new("/nonexistent/locations.json"));
        assert!(matches!(result, Err(CatalogError::NotFound { .. })));
    }

    #[test]
    fn missing_locations_field_is_malformed() {
        let result = LocationCatalog::parse(r#"{"places": ["Paris"]}"#, Path::new("x.json"));
        assert!(matches!(result, Err(CatalogError::Malformed { .. })));
    }

    #[test]
    fn non_string_entries_are_malformed() {
        let result = LocationCatalog::parse(r#"{"locations": [1, 2]}"#, Path::new("x.json"));
        assert!(matches!(result, Err(CatalogError::Malformed { .. })));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let result = LocationCatalog::parse("locations: Paris", Path::new("x.json"));
        assert!(matches!(result, Err(CatalogError::Malformed { .. })));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let catalog = LocationCatalog::parse(
            r#"{"version": 2, "locations": ["Oslo"]}"#,
            Path::new("x.json"),
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
