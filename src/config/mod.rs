//! # Config Module
//!
//! Builds the immutable [`BatchConfig`] a run works from.
//!
//! Values are resolved once at startup by a [`ConfigResolver`] that asks a
//! chain of [`ConfigSource`]s in priority order (usually explicit arguments,
//! then the environment, then an interactive prompt) and falls back to the
//! key's default. Core batch logic only ever sees the finished `BatchConfig`.

mod source;

pub use source::{ConfigSource, EnvSource, ExplicitSource, PromptSource};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_FILE: &str = "state.json";
pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_IMAGES_PER_FOLDER: usize = 6;

/// A single configuration setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    SourceDir,
    TargetDir,
    LocationsJson,
    StateFile,
    BatchSize,
    ImagesPerFolder,
}

impl ConfigKey {
    /// Environment variable the key is read from
    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigKey::SourceDir => "SOURCE_DIR",
            ConfigKey::TargetDir => "TARGET_DIR",
            ConfigKey::LocationsJson => "LOCATIONS_JSON",
            ConfigKey::StateFile => "STATE_FILE",
            ConfigKey::BatchSize => "BATCH_SIZE",
            ConfigKey::ImagesPerFolder => "IMAGES_PER_FOLDER",
        }
    }

    /// Question shown when prompting interactively
    pub fn prompt(&self) -> &'static str {
        match self {
            ConfigKey::SourceDir => {
                "Enter the path to the source directory containing original folders"
            }
            ConfigKey::TargetDir => {
                "Enter the path to the target directory where new folders will be created"
            }
            ConfigKey::LocationsJson => "Enter the path to the locations.json file",
            ConfigKey::StateFile => "Enter the path to the state file",
            ConfigKey::BatchSize => "Enter the number of folders to process per run",
            ConfigKey::ImagesPerFolder => "Enter the number of images to copy per new folder",
        }
    }

    /// Value used when no source provides one; `None` means required
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            ConfigKey::StateFile => Some(DEFAULT_STATE_FILE),
            ConfigKey::BatchSize => Some("20"),
            ConfigKey::ImagesPerFolder => Some("6"),
            _ => None,
        }
    }
}

/// Settings for one batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory whose sub-folders form the source pool
    pub source_dir: PathBuf,
    /// Directory where one folder per location is created
    pub target_dir: PathBuf,
    /// JSON document with the `locations` list
    pub locations_json: PathBuf,
    /// JSON document recording processed locations
    pub state_file: PathBuf,
    /// Maximum number of locations handled per run
    pub batch_size: usize,
    /// Number of images copied into each new folder
    pub images_per_folder: usize,
}

impl BatchConfig {
    /// Config with the default state file, batch size and images per folder
    pub fn new(
        source_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        locations_json: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            locations_json: locations_json.into(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            batch_size: DEFAULT_BATCH_SIZE,
            images_per_folder: DEFAULT_IMAGES_PER_FOLDER,
        }
    }

    pub fn with_state_file(mut self, state_file: impl Into<PathBuf>) -> Self {
        self.state_file = state_file.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_images_per_folder(mut self, images_per_folder: usize) -> Self {
        self.images_per_folder = images_per_folder;
        self
    }
}

/// Resolves a [`BatchConfig`] from an ordered chain of sources
#[derive(Default)]
pub struct ConfigResolver {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; earlier sources win
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Resolve every key and build the config
    pub fn resolve(&self) -> Result<BatchConfig, ConfigError> {
        Ok(BatchConfig {
            source_dir: self.value(ConfigKey::SourceDir)?.into(),
            target_dir: self.value(ConfigKey::TargetDir)?.into(),
            locations_json: self.value(ConfigKey::LocationsJson)?.into(),
            state_file: self.value(ConfigKey::StateFile)?.into(),
            batch_size: self.number(ConfigKey::BatchSize)?,
            images_per_folder: self.number(ConfigKey::ImagesPerFolder)?,
        })
    }

    fn value(&self, key: ConfigKey) -> Result<String, ConfigError> {
        for source in &self.sources {
            if let Some(value) = source.lookup(key)? {
                let value = value.trim();
                if !value.is_empty() {
                    return Ok(value.to_string());
                }
            }
        }

        key.default_value()
            .map(str::to_string)
            .ok_or(ConfigError::Missing { key: key.env_var() })
    }

    fn number(&self, key: ConfigKey) -> Result<usize, ConfigError> {
        let value = self.value(key)?;
        value.parse().map_err(|_| ConfigError::InvalidNumber {
            key: key.env_var(),
            value,
        })
    }
}

/// Load a `.env` file from the working directory (or its parents).
///
/// With `required` unset a missing file is fine; a present but unparsable
/// file is always an error. Returns the path that was loaded, if any.
pub fn load_dotenv(required: bool) -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() && !required => Ok(None),
        Err(e) => Err(ConfigError::DotEnv(e.to_string())),
    }
}

/// True when a `.env` file sits in `dir`
pub fn dotenv_present(dir: &Path) -> bool {
    dir.join(".env").is_file()
}
