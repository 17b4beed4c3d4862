//! # Source Module
//!
//! Enumerates the source pool: the sub-folders of the source directory and,
//! per folder, the images eligible for copying.
//!
//! ## Recognised Formats
//! jpg, jpeg, png, gif, bmp, tiff (extension match, case-insensitive)
//!
//! Both listings are sorted by file name so that folder assignment is the
//! same on every run and every platform.

mod filter;
mod walker;

pub use filter::{ImageFilter, IMAGE_EXTENSIONS};
pub use walker::WalkDirScanner;

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A directory entry found while listing the pool.
///
/// `path` is the entry as it exists on disk; `name` is for display only and
/// may be lossy when the file name is not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub path: PathBuf,
}

impl SourceEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }
}

/// One folder of candidate images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFolder {
    /// Folder name within the source directory
    pub name: String,
    /// Full path to the folder
    pub path: PathBuf,
    /// Eligible images, sorted by file name
    pub images: Vec<SourceEntry>,
}

/// Snapshot of the source directory for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePool {
    pub root: PathBuf,
    pub folders: Vec<SourceFolder>,
}

impl SourcePool {
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

/// Trait for source pool listings
///
/// Implement this to list sources from somewhere other than the local
/// filesystem (e.g., for testing).
pub trait SourceScanner {
    /// Sub-folders of `source_dir`, in a stable order
    fn list_source_folders(&self, source_dir: &Path) -> Result<Vec<SourceEntry>, SourceError>;

    /// Eligible image files in `folder`, sorted
    fn list_images(&self, folder: &Path) -> Result<Vec<SourceEntry>, SourceError>;

    /// List every folder and its images.
    ///
    /// Fails with [`SourceError::NoSourceFolders`] if there is nothing to draw from.
    fn scan_pool(&self, source_dir: &Path) -> Result<SourcePool, SourceError> {
        let entries = self.list_source_folders(source_dir)?;
        if entries.is_empty() {
            return Err(SourceError::NoSourceFolders {
                path: source_dir.to_path_buf(),
            });
        }

        let mut folders = Vec::with_capacity(entries.len());
        for SourceEntry { name, path } in entries {
            let images = self.list_images(&path)?;
            debug!(folder = %name, images = images.len(), "Scanned source folder");
            folders.push(SourceFolder { name, path, images });
        }

        Ok(SourcePool {
            root: source_dir.to_path_buf(),
            folders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scan_pool_collects_folders_and_images() {
        let temp = TempDir::new().unwrap();
        let beach = temp.path().join("beach");
        let city = temp.path().join("city");
        fs::create_dir(&beach).unwrap();
        fs::create_dir(&city).unwrap();
        fs::write(beach.join("2.jpg"), b"x").unwrap();
        fs::write(beach.join("1.jpg"), b"x").unwrap();

        let pool = WalkDirScanner::new().scan_pool(temp.path()).unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.folders[0].name, "beach");
        let names: Vec<_> = pool.folders[0].images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["1.jpg", "2.jpg"]);
        assert_eq!(pool.folders[0].images[0].path, beach.join("1.jpg"));
        assert_eq!(pool.folders[1].path, city);
        assert!(pool.folders[1].images.is_empty());
    }

    #[test]
    fn empty_source_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("loose.jpg"), b"x").unwrap();

        let result = WalkDirScanner::new().scan_pool(temp.path());

        assert!(matches!(result, Err(SourceError::NoSourceFolders { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_folder_keeps_its_real_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let folder = temp.path().join(OsStr::from_bytes(b"S\xff"));
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("y.jpg"), b"x").unwrap();

        let pool = WalkDirScanner::new().scan_pool(temp.path()).unwrap();

        assert_eq!(pool.folders[0].path, folder);
        assert_eq!(pool.folders[0].name, "S\u{fffd}");
        assert_eq!(pool.folders[0].images[0].path, folder.join("y.jpg"));
    }
}
