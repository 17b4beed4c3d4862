//! Batch run execution.

use super::{PlanPreview, ProgressStatus, RunOutcome, RunSummary};
use crate::config::BatchConfig;
use crate::core::batch::{
    BatchPlan, BatchPlanner, BatchSelection, FolderMaterializer, LocationOutcome, LocationResult,
};
use crate::core::catalog::LocationCatalog;
use crate::core::progress::{JsonProgressStore, ProcessedSet, ProgressStore};
use crate::core::source::{SourceScanner, WalkDirScanner};
use crate::error::{BatchError, Result};
use crate::events::{null_sender, Event, EventSender, MaterializeEvent, RunEvent, RunPhase};
use std::collections::HashSet;
use std::fs;
use std::time::Instant;
use tracing::{info, warn};

/// Builder for a batch runner
pub struct BatchRunnerBuilder {
    config: BatchConfig,
    store: Option<Box<dyn ProgressStore>>,
    scanner: Option<Box<dyn SourceScanner>>,
}

impl BatchRunnerBuilder {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            store: None,
            scanner: None,
        }
    }

    /// Use a custom progress store instead of the config's state file
    pub fn progress_store(mut self, store: Box<dyn ProgressStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom source scanner
    pub fn scanner(mut self, scanner: Box<dyn SourceScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn build(self) -> BatchRunner {
        let store = self
            .store
            .unwrap_or_else(|| Box::new(JsonProgressStore::new(&self.config.state_file)));
        BatchRunner {
            config: self.config,
            store,
            scanner: self.scanner.unwrap_or_else(|| Box::new(WalkDirScanner::new())),
        }
    }
}

/// Catalog and progress as loaded at the start of a run
struct Loaded {
    catalog: LocationCatalog,
    processed: ProcessedSet,
    already_processed: usize,
    stale_entries: usize,
}

/// Runs one batch from a [`BatchConfig`]
pub struct BatchRunner {
    config: BatchConfig,
    store: Box<dyn ProgressStore>,
    scanner: Box<dyn SourceScanner>,
}

impl BatchRunner {
    pub fn builder(config: BatchConfig) -> BatchRunnerBuilder {
        BatchRunnerBuilder::new(config)
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run the next batch without events
    pub fn run(&self) -> Result<RunOutcome> {
        self.run_with_events(&null_sender())
    }

    /// Run the next batch with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<RunOutcome> {
        let start_time = Instant::now();
        let Loaded {
            catalog,
            mut processed,
            already_processed,
            ..
        } = self.load(events)?;

        let plan = match self.plan(&catalog, &processed, events)? {
            Some(plan) => plan,
            None => {
                return Ok(RunOutcome::AllProcessed {
                    total_locations: catalog.len(),
                })
            }
        };

        fs::create_dir_all(&self.config.target_dir).map_err(|source| {
            BatchError::TargetDirectory {
                path: self.config.target_dir.clone(),
                source,
            }
        })?;

        phase(events, RunPhase::Materializing);
        let materializer = FolderMaterializer::new(&self.config.target_dir);
        let before = processed.len();
        let mut summary = RunSummary {
            run_id: plan.id.clone(),
            total_locations: catalog.len(),
            already_processed,
            batch_size: plan.len(),
            ..RunSummary::default()
        };
        let mut results = Vec::with_capacity(plan.len());

        for (index, planned) in plan.locations.iter().enumerate() {
            events.send(Event::Materialize(MaterializeEvent::LocationStarted {
                index,
                total: plan.len(),
                location: planned.location.clone(),
            }));

            let outcome = materializer.materialize(planned, &mut processed, events);
            match &outcome {
                LocationOutcome::Created {
                    images_copied,
                    failures,
                    shortfall,
                    ..
                } => {
                    summary.created += 1;
                    summary.images_copied += images_copied;
                    summary.image_failures += failures.len();
                    summary.partial_selections += usize::from(shortfall.is_some());
                }
                LocationOutcome::AlreadyExists { .. } => summary.skipped_existing += 1,
                LocationOutcome::CreateFailed { .. } => summary.failed += 1,
            }

            results.push(LocationResult {
                location: planned.location.clone(),
                outcome,
            });
        }

        phase(events, RunPhase::SavingProgress);
        self.store.save(&processed)?;
        events.send(Event::Run(RunEvent::ProgressSaved {
            processed_total: processed.len(),
        }));

        summary.newly_processed = processed.len() - before;
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            batch = summary.batch_size,
            newly_processed = summary.newly_processed,
            created = summary.created,
            skipped = summary.skipped_existing,
            failed = summary.failed,
            "Batch processing complete"
        );
        events.send(Event::Run(RunEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(RunOutcome::Completed { summary, results })
    }

    /// Compute the next batch without touching the target directory or state
    pub fn preview(&self) -> Result<PlanPreview> {
        let events = null_sender();
        let loaded = self.load(&events)?;

        Ok(match self.plan(&loaded.catalog, &loaded.processed, &events)? {
            Some(plan) => PlanPreview::Planned {
                plan,
                total_locations: loaded.catalog.len(),
                already_processed: loaded.already_processed,
            },
            None => PlanPreview::AllProcessed {
                total_locations: loaded.catalog.len(),
            },
        })
    }

    /// How far through the catalog the runs have got
    pub fn status(&self) -> Result<ProgressStatus> {
        let loaded = self.load(&null_sender())?;
        let next_location = loaded
            .catalog
            .locations()
            .iter()
            .find(|location| !loaded.processed.contains(location))
            .cloned();

        Ok(ProgressStatus {
            total_locations: loaded.catalog.len(),
            processed: loaded.already_processed,
            remaining: loaded.catalog.len() - loaded.already_processed,
            stale_entries: loaded.stale_entries,
            next_location,
            last_updated: self.store.last_updated()?,
        })
    }

    fn load(&self, events: &EventSender) -> Result<Loaded> {
        phase(events, RunPhase::LoadingCatalog);
        let catalog = LocationCatalog::load(&self.config.locations_json)?;
        info!(total = catalog.len(), "Total locations available");

        phase(events, RunPhase::LoadingProgress);
        let processed = self.store.load()?;

        let known: HashSet<&str> = catalog.locations().iter().map(String::as_str).collect();
        let stale_entries = processed.iter().filter(|l| !known.contains(l)).count();
        if stale_entries > 0 {
            warn!(
                count = stale_entries,
                "State lists locations that are not in the catalog; keeping them"
            );
        }

        let already_processed = catalog
            .locations()
            .iter()
            .filter(|l| processed.contains(l))
            .count();
        info!(count = already_processed, "Already processed locations");

        events.send(Event::Run(RunEvent::Started {
            total_locations: catalog.len(),
            already_processed,
        }));

        Ok(Loaded {
            catalog,
            processed,
            already_processed,
            stale_entries,
        })
    }

    /// Select the batch and, if there is one, scan sources and build the plan.
    ///
    /// `None` means every location is already processed.
    fn plan(
        &self,
        catalog: &LocationCatalog,
        processed: &ProcessedSet,
        events: &EventSender,
    ) -> Result<Option<BatchPlan>> {
        phase(events, RunPhase::Planning);
        let selected = match BatchPlanner::select(catalog, processed, self.config.batch_size) {
            BatchSelection::AllProcessed => {
                info!("All locations have been processed");
                events.send(Event::Run(RunEvent::AllProcessed {
                    total_locations: catalog.len(),
                }));
                return Ok(None);
            }
            BatchSelection::Batch(selected) => selected,
        };

        if let Some(range) = BatchPlanner::range(&selected) {
            info!(
                count = range.count,
                from = range.first_index,
                to = range.last_index,
                "Processing batch"
            );
            events.send(Event::Run(RunEvent::BatchPlanned(range)));
        }

        phase(events, RunPhase::ScanningSources);
        let pool = self.scanner.scan_pool(&self.config.source_dir)?;
        info!(folders = pool.len(), "Total original folders found");
        events.send(Event::Run(RunEvent::SourcesFound {
            folders: pool.len(),
        }));

        let plan = BatchPlanner::create_plan(&selected, &pool, self.config.images_per_folder)?;
        Ok(Some(plan))
    }
}

fn phase(events: &EventSender, phase: RunPhase) {
    events.send(Event::Run(RunEvent::PhaseChanged { phase }));
}
