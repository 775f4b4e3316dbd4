//! Trackmatch CLI
//!
//! Command-line interface for aligning photos against GPS tracks:
//! - Match a photo list against a track
//! - Inspect a track file
//! - Generate a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use trackmatch::align::{export_matches, pluralize, render, run_alignment, OutputFormat};
use trackmatch::config::{generate_default_config, Config, LoggingConfig};
use trackmatch::sources::{read_events_file, read_track_file};
use trackmatch::track::TrackIndex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "trackmatch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assign GPS locations to photos from a recorded track")]
#[command(long_about = "Trackmatch finds, for every photo, the track point nearest to it in time.\nA photo gets a location only if that point is closer than the time delta.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match photos against a track
    Match {
        /// Track file (.gpx, or .zip of .gpx files)
        track: PathBuf,
        /// CSV photo list with name and timestamp columns
        events: PathBuf,
        /// Time delta in seconds; matches must be strictly closer
        #[arg(short, long)]
        delta: Option<u64>,
        /// Offset added to photo times, e.g. "+2h", "-05:00", "-3600"
        #[arg(short, long, allow_hyphen_values = true)]
        offset: Option<String>,
        /// Also match photos that already have a location
        #[arg(long)]
        include_located: bool,
        /// Worker threads
        #[arg(short, long)]
        workers: Option<usize>,
        /// Output format (table, json, csv)
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Write matched photos with their coordinates to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Show what a track file contains
    Inspect {
        /// Track file (.gpx, or .zip of .gpx files)
        track: PathBuf,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default()?,
    };

    init_logging(&config.logging);
    tracing::debug!("Trackmatch v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Match {
            track,
            events,
            delta,
            offset,
            include_located,
            workers,
            format,
            export,
        } => {
            // Command-line flags win over config
            if let Some(delta) = delta {
                config.matching.delta_secs = delta;
            }
            if offset.is_some() {
                config.matching.offset = offset;
            }
            if include_located {
                config.matching.include_located = true;
            }
            if let Some(workers) = workers {
                config.matching.workers = workers;
            }
            let format = format.unwrap_or(config.output.format);
            let options = config.matching.align_options()?;

            let index = load_index(&track)?;

            tracing::info!("Loading photo list from {:?}", events);
            let load = read_events_file(&events)
                .with_context(|| format!("Failed to read photo list {}", events.display()))?;
            for error in &load.errors {
                tracing::warn!("{}", error);
            }

            let candidates = load
                .events
                .iter()
                .filter(|e| options.include_located || !e.has_location())
                .count();
            tracing::info!(
                "Checking {} {} (delta {}, offset {})",
                candidates,
                pluralize(candidates, "photo", "photos"),
                options.threshold,
                config.matching.offset.as_deref().unwrap_or("none")
            );

            let report = run_alignment(&index, &load.events, &options)?;
            print!("{}", render(&report, format)?);

            if let Some(path) = export {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                let written = export_matches(&report, BufWriter::new(file))?;
                tracing::info!(
                    "Exported {} {} to {:?}",
                    written,
                    pluralize(written, "location", "locations"),
                    path
                );
            }
        }

        Commands::Inspect { track } => {
            let index = load_index(&track)?;
            let span = index.span()?;

            println!("Track points:  {}", index.len());
            println!("Without time:  {}", index.dropped());
            println!("Earliest:      {}", index.first()?);
            println!("Latest:        {}", index.last()?);
            println!("Duration:      {}s", span.duration().num_seconds());
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Read and index a track, failing when it has nothing to match against
fn load_index(path: &Path) -> anyhow::Result<TrackIndex> {
    tracing::info!("Loading track data from {:?}", path);

    let load = read_track_file(path)
        .with_context(|| format!("Failed to read track {}", path.display()))?;
    let total = load.records.len();
    let index = TrackIndex::from_records(load.records)
        .with_context(|| format!("Invalid track data in {}", path.display()))?;

    if total == 0 {
        bail!("No tracks found in {}", path.display());
    }
    if index.is_empty() {
        bail!(
            "No usable track data in {}: all {} {} lack a timestamp",
            path.display(),
            total,
            pluralize(total, "track point", "track points")
        );
    }

    tracing::info!(
        "Loaded {} {} from {} {}",
        index.len(),
        pluralize(index.len(), "track point", "track points"),
        load.files.len(),
        pluralize(load.files.len(), "file", "files")
    );
    if index.dropped() > 0 {
        tracing::warn!(
            "Ignored {} {} without a timestamp",
            index.dropped(),
            pluralize(index.dropped(), "track point", "track points")
        );
    }
    tracing::info!("Earliest: {}", index.first()?);
    tracing::info!("Latest: {}", index.last()?);

    Ok(index)
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("trackmatch={}", config.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so the report on stdout stays clean
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
