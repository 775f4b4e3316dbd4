//! # Trackmatch
//!
//! Temporal alignment of photos against GPS tracks: each photo is assigned
//! the track point nearest to it in time, provided the gap is below a
//! threshold and after an optional clock-skew offset.
//!
//! ## Features
//!
//! - **Sorted track index**: untimed points dropped, stable time ordering
//! - **O(log n) lookup**: bisect plus a three-candidate window
//! - **Deterministic ties**: equidistant candidates resolve to the earlier point
//! - **Strict acceptance**: a gap equal to the threshold is rejected
//! - **Inputs**: GPX tracks (plain or zipped), CSV photo lists
//!
//! ## Modules
//!
//! - [`track`]: Samples and the track index
//! - [`matcher`]: Nearest search, acceptance policy, offsets
//! - [`sources`]: GPX and CSV readers
//! - [`align`]: Batch alignment and reports
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use trackmatch::align::{run_alignment, AlignOptions};
//! use trackmatch::sources::{read_events_file, read_track_file};
//! use trackmatch::track::TrackIndex;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load and index the track
//!     let load = read_track_file(Path::new("ride.gpx"))?;
//!     let index = TrackIndex::from_records(load.records)?;
//!
//!     // Align photos against it
//!     let events = read_events_file(Path::new("photos.csv"))?;
//!     let report = run_alignment(&index, &events.events, &AlignOptions::default())?;
//!
//!     for (photo, hit) in report.matches() {
//!         println!("{}: {}, {}", photo.name, hit.sample.latitude, hit.sample.longitude);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod align;
pub mod config;
pub mod matcher;
pub mod sources;
pub mod track;

// Re-export top-level types for convenience
pub use track::{RawTrackRecord, TimeSpan, TrackError, TrackIndex, TrackResult, TrackSample};

pub use matcher::{
    accept, apply_offset, parse_offset, MatchResult, NearestMatcher, OffsetParseError, Threshold,
};

pub use sources::{Event, EventLoad, SourceError, TrackLoad};

pub use align::{run_alignment, AlignOptions, AlignmentReport, Outcome, OutputFormat};

pub use config::{Config, ConfigError, LoggingConfig, MatchingConfig};
