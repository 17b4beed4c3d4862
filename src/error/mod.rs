//! # Error Module
//!
//! Error types for the location batcher.
//!
//! ## Design Principles
//! - **Fatal vs per-item** - only run-halting conditions are errors; per-location
//!   problems (existing folder, failed copy) are recorded as outcomes instead
//! - **Include context** - paths, field names, what went wrong
//! - **Recovery hints** - suggest how to fix when possible

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Location catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Source pool error: {0}")]
    Source(#[from] SourceError),

    #[error("Progress state error: {0}")]
    Progress(#[from] ProgressError),

    #[error("Failed to create target directory {path}: {source}")]
    TargetDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BatchError {
    /// True for the errors caused by bad inputs rather than broken state:
    /// missing catalog, missing source directory, no source folders.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            BatchError::Config(_) | BatchError::Catalog(_) | BatchError::Source(_)
        )
    }
}

/// Errors while resolving the run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting {key}. Pass it as an argument or set the environment variable.")]
    Missing { key: &'static str },

    #[error("Invalid value for {key}: '{value}' is not a non-negative integer")]
    InvalidNumber { key: &'static str, value: String },

    #[error("Failed to read {key} from the terminal: {source}")]
    Prompt {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load .env file: {0}")]
    DotEnv(String),
}

/// Errors loading the location catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog file {path} is not valid: {source}. Expected an object with a \"locations\" list of strings.")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while scanning the source pool
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("No source folders found in {path}. Add at least one sub-folder with images.")]
    NoSourceFolders { path: PathBuf },
}

/// Errors with the persisted progress state
#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("State file {path} is corrupted: {source}. Fix or delete this file and try again.")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save state file {path}: {reason}. The previous state was left unchanged.")]
    Persist { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_includes_path() {
        let error = CatalogError::NotFound {
            path: PathBuf::from("/data/locations.json"),
        };
        assert!(error.to_string().contains("/data/locations.json"));
    }

    #[test]
    fn corrupted_state_suggests_recovery() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error = ProgressError::Corrupted {
            path: PathBuf::from("state.json"),
            source,
        };
        let message = error.to_string();
        assert!(message.contains("state.json"));
        assert!(message.contains("delete this file"));
    }

    #[test]
    fn configuration_errors_are_classified() {
        let missing_source: BatchError = SourceError::NoSourceFolders {
            path: PathBuf::from("/pool"),
        }
        .into();
        assert!(missing_source.is_configuration_error());

        let persist: BatchError = ProgressError::Persist {
            path: PathBuf::from("state.json"),
            reason: "disk full".to_string(),
        }
        .into();
        assert!(!persist.is_configuration_error());
    }

    #[test]
    fn missing_setting_names_the_key() {
        let error = ConfigError::Missing { key: "SOURCE_DIR" };
        assert!(error.to_string().contains("SOURCE_DIR"));
    }
}
