//! Image extension filtering for source folders.

use std::collections::HashSet;
use std::path::Path;

/// Extensions recognised as images, lowercase
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff"];

/// Decides which files in a source folder are eligible images
#[derive(Debug, Clone)]
pub struct ImageFilter {
    extensions: HashSet<String>,
}

impl ImageFilter {
    /// Filter accepting [`IMAGE_EXTENSIONS`]
    pub fn new() -> Self {
        Self {
            extensions: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Check if a file name has a recognised extension (case-insensitive)
    pub fn should_include(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_recognised_extensions_in_any_case() {
        let filter = ImageFilter::new();
        for name in ["a.jpg", "b.JPEG", "c.Png", "d.gif", "e.BMP", "f.tiff"] {
            assert!(filter.should_include(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn rejects_other_files() {
        let filter = ImageFilter::new();
        for name in ["notes.txt", "clip.mp4", "photo.webp", "photo.tif", "README", "jpg"] {
            assert!(!filter.should_include(Path::new(name)), "{name}");
        }
    }
}
