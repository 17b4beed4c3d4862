//! # CLI Module
//!
//! Command-line interface for the location batcher.
//!
//! ## Usage
//! ```bash
//! # Process the next batch (missing settings are read from the environment,
//! # then asked for interactively)
//! location-batch run --source-dir ~/pool --target-dir ~/out --locations locations.json
//!
//! # Load settings from .env and never prompt
//! location-batch run --env --no-prompt
//!
//! # Preview the next batch without touching anything
//! location-batch plan --batch-size 5
//!
//! # Progress through the catalog as JSON
//! location-batch status --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use location_batcher::config::{
    self, BatchConfig, ConfigKey, ConfigResolver, EnvSource, ExplicitSource, PromptSource,
};
use location_batcher::core::batch::{BatchPlan, LocationOutcome, LocationResult};
use location_batcher::core::runner::{
    BatchRunner, PlanPreview, ProgressStatus, RunOutcome, RunSummary,
};
use location_batcher::error::Result;
use location_batcher::events::{Event, EventChannel, MaterializeEvent, RunEvent};
use serde::Serialize;
use std::path::Path;
use std::thread;

/// Location Batcher - one folder of images per location, a batch at a time
#[derive(Parser, Debug)]
#[command(name = "location-batch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process the next batch of unprocessed locations
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Print every created folder and copied image
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show the next batch without creating folders or saving progress
    Plan {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Show how many locations are processed and remaining
    Status {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

/// Settings; anything not given here comes from the environment or a prompt
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Directory containing the source folders [env: SOURCE_DIR]
    #[arg(long)]
    source_dir: Option<String>,

    /// Directory where new folders are created [env: TARGET_DIR]
    #[arg(long)]
    target_dir: Option<String>,

    /// JSON file with the list of locations [env: LOCATIONS_JSON]
    #[arg(long)]
    locations: Option<String>,

    /// JSON file recording processed locations [env: STATE_FILE, default: state.json]
    #[arg(long)]
    state_file: Option<String>,

    /// Locations to process per run [env: BATCH_SIZE, default: 20]
    #[arg(long)]
    batch_size: Option<usize>,

    /// Images to copy into each new folder [env: IMAGES_PER_FOLDER, default: 6]
    #[arg(long)]
    images_per_folder: Option<usize>,

    /// Load configuration from a .env file (fails if there is none)
    #[arg(long)]
    env: bool,

    /// Never prompt; fail if a required setting is missing
    #[arg(long)]
    no_prompt: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            verbose,
        } => run_batch(resolve_config(&config)?, output, verbose),
        Commands::Plan { config, output } => run_plan(resolve_config(&config)?, output),
        Commands::Status { config, output } => run_status(resolve_config(&config)?, output),
    }
}

fn resolve_config(args: &ConfigArgs) -> Result<BatchConfig> {
    if args.env || config::dotenv_present(Path::new(".")) {
        config::load_dotenv(args.env)?;
    }

    let explicit = ExplicitSource::new()
        .set_opt(ConfigKey::SourceDir, args.source_dir.clone())
        .set_opt(ConfigKey::TargetDir, args.target_dir.clone())
        .set_opt(ConfigKey::LocationsJson, args.locations.clone())
        .set_opt(ConfigKey::StateFile, args.state_file.clone())
        .set_opt(ConfigKey::BatchSize, args.batch_size.map(|n| n.to_string()))
        .set_opt(
            ConfigKey::ImagesPerFolder,
            args.images_per_folder.map(|n| n.to_string()),
        );

    let mut resolver = ConfigResolver::new()
        .with_source(explicit)
        .with_source(EnvSource);
    if !args.no_prompt && Term::stdout().is_term() {
        resolver = resolver.with_source(PromptSource::new());
    }

    Ok(resolver.resolve()?)
}

fn run_batch(config: BatchConfig, output: OutputFormat, verbose: bool) -> Result<()> {
    let term = Term::stderr();
    let runner = BatchRunner::builder(config).build();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Location Batcher").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Run(RunEvent::Started {
                    total_locations,
                    already_processed,
                }) => {
                    pb.println(format!("Total locations available: {}", total_locations));
                    pb.println(format!("Already processed locations: {}", already_processed));
                }
                Event::Run(RunEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Run(RunEvent::BatchPlanned(range)) => {
                    pb.set_length(range.count as u64);
                    pb.println(format!(
                        "Processing {} locations from index {} to {}",
                        range.count, range.first_index, range.last_index
                    ));
                }
                Event::Run(RunEvent::SourcesFound { folders }) => {
                    pb.println(format!("Total original folders found: {}", folders));
                }
                Event::Materialize(MaterializeEvent::LocationStarted {
                    index, location, ..
                }) => {
                    pb.set_position(index as u64);
                    pb.set_message(location);
                }
                Event::Materialize(MaterializeEvent::FolderCreated { path }) if verbose => {
                    pb.println(format!("Created new folder: {}", path.display()));
                }
                Event::Materialize(MaterializeEvent::SourceSelected { source_folder })
                    if verbose =>
                {
                    pb.println(format!("Selecting from original folder: {}", source_folder));
                }
                Event::Materialize(MaterializeEvent::ImageCopied { image, folder }) if verbose => {
                    pb.println(format!("Copied '{}' to '{}'", image, folder));
                }
                Event::Materialize(MaterializeEvent::FolderExists { folder }) => {
                    pb.println(format!(
                        "{} Folder '{}' already exists. Skipping this location.",
                        style("•").yellow(),
                        folder
                    ));
                }
                Event::Materialize(MaterializeEvent::FolderCreateFailed { folder, message }) => {
                    pb.println(format!(
                        "{} Error creating folder '{}': {}",
                        style("✗").red(),
                        folder,
                        message
                    ));
                }
                Event::Materialize(MaterializeEvent::PartialSelection {
                    source_folder,
                    requested,
                    available,
                }) => {
                    pb.println(format!(
                        "{} Not enough images in '{}'. Needed {}, found {}.",
                        style("Warning:").yellow(),
                        source_folder,
                        requested,
                        available
                    ));
                }
                Event::Materialize(MaterializeEvent::ImageCopyFailed {
                    image,
                    folder,
                    message,
                }) => {
                    pb.println(format!(
                        "{} Error copying '{}' to '{}': {}",
                        style("✗").red(),
                        image,
                        folder,
                        message
                    ));
                }
                Event::Materialize(MaterializeEvent::LocationFinished { .. }) => {
                    pb.inc(1);
                }
                Event::Run(RunEvent::Completed { .. }) | Event::Run(RunEvent::AllProcessed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = runner.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let outcome = result?;
    match output {
        OutputFormat::Pretty => print_pretty_outcome(&term, &outcome, runner.config()),
        OutputFormat::Json => print_json_outcome(&outcome),
    }

    Ok(())
}

fn print_pretty_outcome(term: &Term, outcome: &RunOutcome, config: &BatchConfig) {
    term.write_line("").ok();

    let (summary, results) = match outcome {
        RunOutcome::AllProcessed { total_locations } => {
            term.write_line(&format!(
                "{} All {} locations have been processed.",
                style("✓").green().bold(),
                style(total_locations).cyan()
            ))
            .ok();
            return;
        }
        RunOutcome::Completed { summary, results } => (summary, results),
    };

    term.write_line(&format!(
        "{} Batch processing complete. {} locations processed.",
        style("✓").green().bold(),
        style(summary.batch_size).cyan()
    ))
    .ok();
    term.write_line("").ok();

    print_summary_counts(term, summary);

    let failed: Vec<&LocationResult> = results
        .iter()
        .filter(|r| matches!(r.outcome, LocationOutcome::CreateFailed { .. }))
        .collect();
    if !failed.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style("Left for the next run:").bold().underlined()
        ))
        .ok();
        for result in failed {
            term.write_line(&format!("    {} {}", style("○").dim(), result.location))
                .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!("Progress saved to {}", config.state_file.display())).dim()
    ))
    .ok();
}

fn print_summary_counts(term: &Term, summary: &RunSummary) {
    let lines = [
        (summary.total_locations, "locations in catalog"),
        (summary.already_processed, "already processed before this run"),
        (summary.newly_processed, "newly processed"),
        (summary.created, "folders created"),
        (summary.images_copied, "images copied"),
    ];
    for (count, label) in lines {
        term.write_line(&format!("  {} {}", style(count).cyan(), label))
            .ok();
    }

    let warnings = [
        (summary.skipped_existing, "skipped (folder already existed)"),
        (summary.partial_selections, "with fewer images than requested"),
        (summary.image_failures, "images failed to copy"),
        (summary.failed, "folders could not be created"),
    ];
    for (count, label) in warnings {
        if count > 0 {
            term.write_line(&format!("  {} {}", style(count).yellow(), label))
                .ok();
        }
    }
}

fn print_json_outcome(outcome: &RunOutcome) {
    let output = match outcome {
        RunOutcome::AllProcessed { total_locations } => serde_json::json!({
            "status": "all_processed",
            "total_locations": total_locations,
        }),
        RunOutcome::Completed { summary, results } => serde_json::json!({
            "status": "completed",
            "summary": summary,
            "results": results,
        }),
    };
    print_json(&output);
}

fn run_plan(config: BatchConfig, output: OutputFormat) -> Result<()> {
    let preview = BatchRunner::builder(config).build().preview()?;

    match output {
        OutputFormat::Json => match &preview {
            PlanPreview::AllProcessed { total_locations } => print_json(&serde_json::json!({
                "status": "all_processed",
                "total_locations": total_locations,
            })),
            PlanPreview::Planned {
                plan,
                total_locations,
                already_processed,
            } => print_json(&serde_json::json!({
                "status": "planned",
                "total_locations": total_locations,
                "already_processed": already_processed,
                "plan": plan,
            })),
        },
        OutputFormat::Pretty => print_pretty_plan(&Term::stderr(), &preview),
    }

    Ok(())
}

fn print_pretty_plan(term: &Term, preview: &PlanPreview) {
    let (plan, total, already): (&BatchPlan, usize, usize) = match preview {
        PlanPreview::AllProcessed { total_locations } => {
            term.write_line(&format!(
                "{} All {} locations have been processed.",
                style("✓").green().bold(),
                total_locations
            ))
            .ok();
            return;
        }
        PlanPreview::Planned {
            plan,
            total_locations,
            already_processed,
        } => (plan, *total_locations, *already_processed),
    };

    term.write_line(&format!(
        "{} ({} of {} already processed)",
        style("Next batch:").bold().underlined(),
        already,
        total
    ))
    .ok();
    if let Some(range) = plan.range {
        term.write_line(&format!(
            "  {} locations, catalog index {} to {}",
            style(range.count).cyan(),
            range.first_index,
            range.last_index
        ))
        .ok();
    }
    term.write_line("").ok();

    for planned in &plan.locations {
        term.write_line(&format!(
            "  {} {} {} {} ({} images)",
            style(&planned.location).bold(),
            style("→").dim(),
            planned.folder_name,
            style(format!("from {}", planned.source_folder)).dim(),
            planned.images.len()
        ))
        .ok();
        if let Some(shortfall) = planned.shortfall {
            term.write_line(&format!(
                "      {} only {} of {} images available",
                style("Warning:").yellow(),
                shortfall.available,
                shortfall.requested
            ))
            .ok();
        }
    }

    let short = plan.shortfall_count();
    if short > 0 {
        term.write_line("").ok();
        term.write_line(&format!(
            "  {} {} with fewer images than requested",
            style(short).yellow(),
            if short == 1 { "location" } else { "locations" }
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Nothing was created. Use `run` to process this batch.").dim()
    ))
    .ok();
}

fn run_status(config: BatchConfig, output: OutputFormat) -> Result<()> {
    let status = BatchRunner::builder(config).build().status()?;

    match output {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Pretty => print_pretty_status(&Term::stderr(), &status),
    }

    Ok(())
}

fn print_pretty_status(term: &Term, status: &ProgressStatus) {
    term.write_line(&format!(
        "  {} locations in catalog",
        style(status.total_locations).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} processed",
        style(status.processed).green()
    ))
    .ok();
    term.write_line(&format!(
        "  {} remaining",
        style(status.remaining).yellow()
    ))
    .ok();

    if status.stale_entries > 0 {
        term.write_line(&format!(
            "  {} state entries not in the catalog",
            style(status.stale_entries).dim()
        ))
        .ok();
    }

    if let Some(next) = &status.next_location {
        term.write_line(&format!("  Next up: {}", style(next).bold()))
            .ok();
    }

    let saved = match status.last_updated {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "never".to_string(),
    };
    term.write_line(&format!("  {}", style(format!("Last saved: {}", saved)).dim()))
        .ok();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}
