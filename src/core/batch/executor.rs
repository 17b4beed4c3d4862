//! Materializes planned locations as folders on disk.

use super::types::*;
use crate::core::progress::ProcessedSet;
use crate::events::{Event, EventSender, MaterializeEvent};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Creates destination folders and fills them with images
pub struct FolderMaterializer {
    target_dir: PathBuf,
}

impl FolderMaterializer {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    /// Realize one planned location.
    ///
    /// Marks the location in `processed` unless its folder could not be
    /// created. Never fails: per-item problems are reported in the outcome.
    pub fn materialize(
        &self,
        planned: &PlannedLocation,
        processed: &mut ProcessedSet,
        events: &EventSender,
    ) -> LocationOutcome {
        let folder = self.target_dir.join(&planned.folder_name);

        if folder.exists() {
            info!(folder = %planned.folder_name, "Folder already exists, skipping location");
            events.send(Event::Materialize(MaterializeEvent::FolderExists {
                folder: planned.folder_name.clone(),
            }));
            processed.insert(planned.location.as_str());
            return LocationOutcome::AlreadyExists { folder };
        }

        if let Err(e) = fs::create_dir(&folder) {
            warn!(folder = %planned.folder_name, error = %e, "Failed to create folder");
            events.send(Event::Materialize(MaterializeEvent::FolderCreateFailed {
                folder: planned.folder_name.clone(),
                message: e.to_string(),
            }));
            return LocationOutcome::CreateFailed {
                folder,
                message: e.to_string(),
            };
        }

        info!(path = %folder.display(), "Created new folder");
        events.send(Event::Materialize(MaterializeEvent::FolderCreated {
            path: folder.clone(),
        }));
        events.send(Event::Materialize(MaterializeEvent::SourceSelected {
            source_folder: planned.source_folder.clone(),
        }));

        if let Some(shortfall) = planned.shortfall {
            warn!(
                source = %planned.source_folder,
                needed = shortfall.requested,
                found = shortfall.available,
                "Not enough images in source folder"
            );
            events.send(Event::Materialize(MaterializeEvent::PartialSelection {
                source_folder: planned.source_folder.clone(),
                requested: shortfall.requested,
                available: shortfall.available,
            }));
        }

        let mut images_copied = 0;
        let mut failures = Vec::new();

        for image in &planned.images {
            let destination = match image.path.file_name() {
                Some(file_name) => folder.join(file_name),
                None => folder.join(&image.name),
            };

            match copy_with_metadata(&image.path, &destination) {
                Ok(bytes) => {
                    images_copied += 1;
                    debug!(image = %image.name, bytes, folder = %planned.folder_name, "Copied image");
                    events.send(Event::Materialize(MaterializeEvent::ImageCopied {
                        image: image.name.clone(),
                        folder: planned.folder_name.clone(),
                    }));
                }
                Err(e) => {
                    warn!(image = %image.name, folder = %planned.folder_name, error = %e, "Failed to copy image");
                    events.send(Event::Materialize(MaterializeEvent::ImageCopyFailed {
                        image: image.name.clone(),
                        folder: planned.folder_name.clone(),
                        message: e.to_string(),
                    }));
                    failures.push(ImageCopyFailure {
                        image: image.name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        processed.insert(planned.location.as_str());
        info!(
            location = %planned.location,
            folder = %planned.folder_name,
            images_copied,
            "Finished processing location"
        );
        events.send(Event::Materialize(MaterializeEvent::LocationFinished {
            location: planned.location.clone(),
            folder: planned.folder_name.clone(),
        }));

        LocationOutcome::Created {
            folder,
            images_copied,
            failures,
            shortfall: planned.shortfall,
        }
    }
}

/// Copy a file keeping its name, permissions and timestamps.
///
/// Contents and permissions must copy; timestamps are kept where the
/// platform allows it.
fn copy_with_metadata(source: &Path, destination: &Path) -> io::Result<u64> {
    let bytes = fs::copy(source, destination)?;

    if let Err(e) = copy_times(source, destination) {
        debug!(path = %destination.display(), error = %e, "Could not preserve timestamps");
    }

    Ok(bytes)
}

fn copy_times(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    // Windows needs write access to change file times; read-only copies fall
    // back to a plain open, which is enough for the owner on Unix
    let file = File::options()
        .write(true)
        .open(destination)
        .or_else(|_| File::open(destination))?;
    file.set_times(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::SourceEntry;
    use crate::events::{null_sender, EventChannel};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        source: PathBuf,
        target: PathBuf,
    }

    fn fixture(images: &[&str]) -> Fixture {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("pool/S1");
        let target = temp.path().join("out");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&target).unwrap();
        for image in images {
            fs::write(source.join(image), image.as_bytes()).unwrap();
        }
        Fixture {
            _temp: temp,
            source,
            target,
        }
    }

    fn planned(location: &str, source: &Path, images: &[&str]) -> PlannedLocation {
        PlannedLocation {
            location: location.to_string(),
            catalog_index: 0,
            folder_name: super::super::sanitize_folder_name(location),
            source_folder: "S1".to_string(),
            source_path: source.to_path_buf(),
            images: images.iter().map(|i| SourceEntry::new(source.join(i))).collect(),
            shortfall: None,
        }
    }

    #[test]
    fn creates_folder_and_copies_images() {
        let fx = fixture(&["x.jpg", "y.png"]);
        let mut processed = ProcessedSet::new();

        let outcome = FolderMaterializer::new(&fx.target).materialize(
            &planned("B", &fx.source, &["x.jpg", "y.png"]),
            &mut processed,
            &null_sender(),
        );

        assert!(matches!(
            outcome,
            LocationOutcome::Created {
                images_copied: 2,
                ..
            }
        ));
        assert_eq!(fs::read(fx.target.join("B/x.jpg")).unwrap(), b"x.jpg");
        assert!(fx.target.join("B/y.png").is_file());
        assert!(processed.contains("B"));
    }

    #[test]
    fn existing_folder_is_skipped_and_marked() {
        let fx = fixture(&["x.jpg"]);
        fs::create_dir(fx.target.join("D")).unwrap();
        let mut processed = ProcessedSet::new();

        let outcome = FolderMaterializer::new(&fx.target).materialize(
            &planned("D", &fx.source, &["x.jpg"]),
            &mut processed,
            &null_sender(),
        );

        assert!(matches!(outcome, LocationOutcome::AlreadyExists { .. }));
        assert!(processed.contains("D"));
        assert!(!fx.target.join("D/x.jpg").exists());
    }

    #[test]
    fn create_failure_leaves_location_unprocessed() {
        let fx = fixture(&["x.jpg"]);
        let missing_target = fx.target.join("does/not/exist");
        let mut processed = ProcessedSet::new();

        let outcome = FolderMaterializer::new(&missing_target).materialize(
            &planned("E", &fx.source, &["x.jpg"]),
            &mut processed,
            &null_sender(),
        );

        assert!(matches!(outcome, LocationOutcome::CreateFailed { .. }));
        assert!(!outcome.marks_processed());
        assert!(!processed.contains("E"));
    }

    #[test]
    fn failed_copy_does_not_stop_remaining_images() {
        let fx = fixture(&["a.jpg", "c.jpg"]);
        let mut processed = ProcessedSet::new();

        let outcome = FolderMaterializer::new(&fx.target).materialize(
            &planned("F", &fx.source, &["a.jpg", "b.jpg", "c.jpg"]),
            &mut processed,
            &null_sender(),
        );

        match outcome {
            LocationOutcome::Created {
                images_copied,
                failures,
                ..
            } => {
                assert_eq!(images_copied, 2);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].image, "b.jpg");
            }
            other => panic!("expected Created, got {:?}", other),
        }
        assert!(fx.target.join("F/c.jpg").is_file());
        assert!(processed.contains("F"));
    }

    #[test]
    fn sanitized_name_is_used_for_the_folder() {
        let fx = fixture(&["x.jpg"]);
        let mut processed = ProcessedSet::new();

        FolderMaterializer::new(&fx.target).materialize(
            &planned("Rio: Copacabana?", &fx.source, &["x.jpg"]),
            &mut processed,
            &null_sender(),
        );

        assert!(fx.target.join("Rio_ Copacabana_/x.jpg").is_file());
        assert!(processed.contains("Rio: Copacabana?"));
    }

    #[test]
    fn zero_images_creates_empty_folder() {
        let fx = fixture(&["x.jpg"]);
        let mut processed = ProcessedSet::new();

        FolderMaterializer::new(&fx.target).materialize(
            &planned("Empty", &fx.source, &[]),
            &mut processed,
            &null_sender(),
        );

        let folder = fx.target.join("Empty");
        assert!(folder.is_dir());
        assert_eq!(fs::read_dir(folder).unwrap().count(), 0);
    }

    #[test]
    fn shortfall_emits_partial_selection_event() {
        let fx = fixture(&["x.jpg"]);
        let mut plan = planned("G", &fx.source, &["x.jpg"]);
        plan.shortfall = Some(SelectionShortfall {
            requested: 4,
            available: 1,
        });
        let (sender, receiver) = EventChannel::new();

        FolderMaterializer::new(&fx.target).materialize(&plan, &mut ProcessedSet::new(), &sender);
        drop(sender);

        let partial = receiver.iter().any(|event| {
            matches!(
                event,
                Event::Materialize(MaterializeEvent::PartialSelection {
                    requested: 4,
                    available: 1,
                    ..
                })
            )
        });
        assert!(partial);
    }

    #[test]
    fn copy_keeps_modification_time() {
        let fx = fixture(&["old.jpg"]);
        let source = fx.source.join("old.jpg");
        let past = SystemTime::now() - Duration::from_secs(86_400 * 30);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let destination = fx.target.join("old.jpg");
        copy_with_metadata(&source, &destination).unwrap();

        let copied = fs::metadata(&destination).unwrap().modified().unwrap();
        let original = fs::metadata(&source).unwrap().modified().unwrap();
        assert_eq!(copied, original);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_image_name_is_copied_as_is() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let fx = fixture(&[]);
        let raw = OsStr::from_bytes(b"p\xff.jpg");
        fs::write(fx.source.join(raw), b"x").unwrap();
        let mut plan = planned("H", &fx.source, &[]);
        plan.images = vec![SourceEntry::new(fx.source.join(raw))];

        let outcome =
            FolderMaterializer::new(&fx.target).materialize(&plan, &mut ProcessedSet::new(), &null_sender());

        assert!(matches!(
            outcome,
            LocationOutcome::Created {
                images_copied: 1,
                ..
            }
        ));
        assert!(fx.target.join("H").join(raw).is_file());
    }
}
