//! Plan generator for batch runs.

use super::types::*;
use crate::core::catalog::LocationCatalog;
use crate::core::progress::ProcessedSet;
use crate::core::source::{SourceEntry, SourcePool};
use crate::error::SourceError;
use crate::events::BatchRange;
use uuid::Uuid;

/// Characters not allowed in folder names on common filesystems
const INVALID_FOLDER_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace characters that can't appear in a folder name with `_`.
///
/// The result is used verbatim as the destination folder name; two
/// locations that sanitize to the same name share one folder.
pub fn sanitize_folder_name(location: &str) -> String {
    location
        .chars()
        .map(|c| if INVALID_FOLDER_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Generates batch plans
pub struct BatchPlanner;

impl BatchPlanner {
    /// Pick the next `batch_size` unprocessed locations, in catalog order
    pub fn select(
        catalog: &LocationCatalog,
        processed: &ProcessedSet,
        batch_size: usize,
    ) -> BatchSelection {
        let mut unprocessed = catalog
            .locations()
            .iter()
            .enumerate()
            .filter(|(_, location)| !processed.contains(location))
            .peekable();

        if unprocessed.peek().is_none() {
            return BatchSelection::AllProcessed;
        }

        BatchSelection::Batch(
            unprocessed
                .take(batch_size)
                .map(|(catalog_index, location)| SelectedLocation {
                    location: location.clone(),
                    catalog_index,
                })
                .collect(),
        )
    }

    /// Pool index for the location at `batch_index`.
    ///
    /// Cycling restarts at the first source folder on every run; there is no
    /// offset carried over from earlier batches.
    pub fn assign_source(batch_index: usize, pool_len: usize) -> usize {
        batch_index % pool_len
    }

    /// Attach a source folder and image selection to every selected location
    pub fn create_plan(
        selected: &[SelectedLocation],
        pool: &SourcePool,
        images_per_folder: usize,
    ) -> Result<BatchPlan, SourceError> {
        if pool.is_empty() {
            return Err(SourceError::NoSourceFolders {
                path: pool.root.clone(),
            });
        }

        let locations = selected
            .iter()
            .enumerate()
            .map(|(i, selection)| {
                let source = &pool.folders[Self::assign_source(i, pool.len())];
                let (images, shortfall) = Self::select_images(&source.images, images_per_folder);

                PlannedLocation {
                    location: selection.location.clone(),
                    catalog_index: selection.catalog_index,
                    folder_name: sanitize_folder_name(&selection.location),
                    source_folder: source.name.clone(),
                    source_path: source.path.clone(),
                    images,
                    shortfall,
                }
            })
            .collect();

        Ok(BatchPlan {
            id: Uuid::new_v4().to_string(),
            locations,
            images_per_folder,
            range: Self::range(selected),
        })
    }

    /// First `wanted` images, or all of them with a shortfall when there are fewer
    fn select_images(
        available: &[SourceEntry],
        wanted: usize,
    ) -> (Vec<SourceEntry>, Option<SelectionShortfall>) {
        let shortfall = (available.len() < wanted).then_some(SelectionShortfall {
            requested: wanted,
            available: available.len(),
        });
        let images = available.iter().take(wanted).cloned().collect();
        (images, shortfall)
    }

    /// Catalog span covered by the selection
    pub fn range(selected: &[SelectedLocation]) -> Option<BatchRange> {
        let first = selected.first()?;
        let last = selected.last()?;
        Some(BatchRange {
            count: selected.len(),
            first_index: first.catalog_index,
            last_index: last.catalog_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::SourceFolder;
    use std::path::PathBuf;

    fn catalog(names: &[&str]) -> LocationCatalog {
        LocationCatalog::from(names.iter().map(|n| n.to_string()).collect::<Vec<_>>())
    }

    fn pool(folders: Vec<(&str, Vec<&str>)>) -> SourcePool {
        SourcePool {
            root: PathBuf::from("/pool"),
            folders: folders
                .into_iter()
                .map(|(name, images)| {
                    let path = PathBuf::from("/pool").join(name);
                    SourceFolder {
                        name: name.to_string(),
                        images: images.iter().map(|i| SourceEntry::new(path.join(i))).collect(),
                        path,
                    }
                })
                .collect(),
        }
    }

    fn batch(selection: BatchSelection) -> Vec<SelectedLocation> {
        match selection {
            BatchSelection::Batch(batch) => batch,
            BatchSelection::AllProcessed => panic!("expected a batch"),
        }
    }

    #[test]
    fn select_skips_processed_and_keeps_catalog_order() {
        let processed: ProcessedSet = ["B", "D"].into_iter().collect();
        let selected = batch(BatchPlanner::select(
            &catalog(&["A", "B", "C", "D", "E"]),
            &processed,
            10,
        ));

        let names: Vec<_> = selected.iter().map(|s| s.location.as_str()).collect();
        assert_eq!(names, ["A", "C", "E"]);
        assert_eq!(selected[1].catalog_index, 2);
    }

    #[test]
    fn select_limits_to_batch_size() {
        let selected = batch(BatchPlanner::select(
            &catalog(&["A", "B", "C"]),
            &ProcessedSet::new(),
            2,
        ));
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn select_reports_all_processed() {
        let processed: ProcessedSet = ["A", "B"].into_iter().collect();
        let selection = BatchPlanner::select(&catalog(&["A", "B"]), &processed, 20);
        assert_eq!(selection, BatchSelection::AllProcessed);
    }

    #[test]
    fn empty_catalog_is_all_processed() {
        let selection = BatchPlanner::select(&catalog(&[]), &ProcessedSet::new(), 20);
        assert_eq!(selection, BatchSelection::AllProcessed);
    }

    #[test]
    fn zero_batch_size_with_work_left_is_an_empty_batch() {
        let selection = BatchPlanner::select(&catalog(&["A"]), &ProcessedSet::new(), 0);
        assert_eq!(selection, BatchSelection::Batch(Vec::new()));
    }

    #[test]
    fn sources_cycle_from_the_first_folder() {
        let selected = batch(BatchPlanner::select(
            &catalog(&["A", "B", "C", "D", "E", "F", "G"]),
            &ProcessedSet::new(),
            7,
        ));
        let plan = BatchPlanner::create_plan(
            &selected,
            &pool(vec![("s1", vec![]), ("s2", vec![]), ("s3", vec![])]),
            0,
        )
        .unwrap();

        let sources: Vec<_> = plan
            .locations
            .iter()
            .map(|l| l.source_folder.as_str())
            .collect();
        assert_eq!(sources, ["s1", "s2", "s3", "s1", "s2", "s3", "s1"]);
    }

    #[test]
    fn assignment_is_balanced_across_the_pool() {
        let (batch_len, pool_len): (usize, usize) = (11, 4);
        let mut counts = vec![0; pool_len];
        for i in 0..batch_len {
            counts[BatchPlanner::assign_source(i, pool_len)] += 1;
        }
        let (low, high) = (batch_len / pool_len, batch_len.div_ceil(pool_len));
        assert!(counts.iter().all(|&c| c == low || c == high));
    }

    #[test]
    fn plan_takes_first_images() {
        let selected = vec![SelectedLocation {
            location: "B".to_string(),
            catalog_index: 1,
        }];
        let plan = BatchPlanner::create_plan(
            &selected,
            &pool(vec![("S1", vec!["x.jpg", "y.png", "z.gif"])]),
            2,
        )
        .unwrap();

        let images: Vec<_> = plan.locations[0]
            .images
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(images, ["x.jpg", "y.png"]);
        assert_eq!(plan.locations[0].images[0].path, PathBuf::from("/pool/S1/x.jpg"));
        assert!(plan.locations[0].shortfall.is_none());
    }

    #[test]
    fn plan_flags_shortfall_and_takes_everything() {
        let selected = vec![SelectedLocation {
            location: "B".to_string(),
            catalog_index: 0,
        }];
        let plan = BatchPlanner::create_plan(
            &selected,
            &pool(vec![("S1", vec!["a.jpg", "b.jpg", "c.jpg"])]),
            10,
        )
        .unwrap();

        let planned = &plan.locations[0];
        assert_eq!(planned.images.len(), 3);
        assert_eq!(
            planned.shortfall,
            Some(SelectionShortfall {
                requested: 10,
                available: 3
            })
        );
        assert_eq!(plan.shortfall_count(), 1);
    }

    #[test]
    fn plan_with_empty_pool_is_rejected() {
        let result = BatchPlanner::create_plan(&[], &pool(vec![]), 6);
        assert!(matches!(result, Err(SourceError::NoSourceFolders { .. })));
    }

    #[test]
    fn range_spans_catalog_indices() {
        let processed: ProcessedSet = ["A", "C"].into_iter().collect();
        let selected = batch(BatchPlanner::select(
            &catalog(&["A", "B", "C", "D", "E"]),
            &processed,
            2,
        ));

        let range = BatchPlanner::range(&selected).unwrap();
        assert_eq!((range.count, range.first_index, range.last_index), (2, 1, 3));
        assert!(BatchPlanner::range(&[]).is_none());
    }

    #[test]
    fn sanitize_replaces_each_invalid_character() {
        assert_eq!(sanitize_folder_name(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_folder_name("São Paulo, BR"), "São Paulo, BR");
    }
}
