//! Source pool listing using walkdir.

use super::{filter::ImageFilter, SourceEntry, SourceScanner};
use crate::error::SourceError;
use std::path::Path;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Lists the immediate children of a directory, sorted by file name
pub struct WalkDirScanner {
    filter: ImageFilter,
}

impl WalkDirScanner {
    pub fn new() -> Self {
        Self {
            filter: ImageFilter::new(),
        }
    }

    /// Direct children of `dir` matching `keep`, in file-name order.
    ///
    /// Only a failure to read `dir` itself is an error. Entries that can't be
    /// resolved (dangling links, link loops) are logged and skipped.
    fn children<F>(&self, dir: &Path, keep: F) -> Result<Vec<SourceEntry>, SourceError>
    where
        F: Fn(&DirEntry) -> bool,
    {
        if !dir.is_dir() {
            return Err(SourceError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        // Follow links so a symlinked folder or image counts like the real thing
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut entries = Vec::new();
        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    if keep(&entry) {
                        entries.push(SourceEntry::new(entry.into_path()));
                    }
                }
                Err(e) if e.depth() == 0 || e.path() == Some(dir) => {
                    return Err(SourceError::ReadDirectory {
                        path: dir.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(
                        path = ?e.path(),
                        error = %e,
                        "Skipping unreadable entry in source pool"
                    );
                }
            }
        }

        Ok(entries)
    }
}

impl Default for WalkDirScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceScanner for WalkDirScanner {
    fn list_source_folders(&self, source_dir: &Path) -> Result<Vec<SourceEntry>, SourceError> {
        self.children(source_dir, |entry| entry.file_type().is_dir())
    }

    fn list_images(&self, folder: &Path) -> Result<Vec<SourceEntry>, SourceError> {
        self.children(folder, |entry| {
            entry.file_type().is_file() && self.filter.should_include(entry.path())
        })
    }
}
