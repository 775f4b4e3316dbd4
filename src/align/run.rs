//! Alignment Run
//!
//! Applies the matcher and acceptance policy to a list of events.
//!
//! # Architecture
//!
//! ```text
//! events ──chunks──► worker 1 ─┐
//!                    worker 2 ─┼─► outcomes (input order) ─► AlignmentReport
//!                    worker N ─┘
//!          (all workers borrow the same &TrackIndex)
//! ```

use crate::matcher::{format_offset, MatchResult, NearestMatcher, Threshold};
use crate::sources::Event;
use crate::track::{TrackError, TrackIndex, TrackResult};
use chrono::Duration;
use serde::Serialize;

/// Settings for one alignment run
#[derive(Debug, Clone, Copy)]
pub struct AlignOptions {
    /// Matches must be strictly closer than this
    pub threshold: Threshold,
    /// Added to every event time before searching
    pub offset: Option<Duration>,
    /// Also align events that already have a location
    pub include_located: bool,
    /// Number of worker threads (1 = run inline)
    pub workers: usize,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            offset: None,
            include_located: false,
            workers: 1,
        }
    }
}

/// What happened to a single event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Nearest sample is within the threshold
    Matched { result: MatchResult },
    /// Nearest sample is too far away
    Rejected { nearest: MatchResult },
    /// Event already had a location
    Skipped,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Matched { .. } => "matched",
            Outcome::Rejected { .. } => "rejected",
            Outcome::Skipped => "skipped",
        }
    }

    /// The nearest sample, whether accepted or not
    pub fn nearest(&self) -> Option<&MatchResult> {
        match self {
            Outcome::Matched { result } => Some(result),
            Outcome::Rejected { nearest } => Some(nearest),
            Outcome::Skipped => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOutcome {
    pub event: Event,
    pub outcome: Outcome,
}

/// Summary and per-event results of a run
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentReport {
    pub run_id: String,
    pub threshold_secs: f64,
    pub offset: Option<String>,
    pub track_points: usize,
    pub matched: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub outcomes: Vec<EventOutcome>,
}

impl AlignmentReport {
    /// Events that were assigned a location
    pub fn matches(&self) -> impl Iterator<Item = (&Event, &MatchResult)> {
        self.outcomes.iter().filter_map(|o| match &o.outcome {
            Outcome::Matched { result } => Some((&o.event, result)),
            _ => None,
        })
    }

    /// Number of events considered (including skipped ones)
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Align every event against the track
///
/// Fails up front with [`TrackError::EmptyIndex`] when the track has no
/// samples. Outcomes are returned in the order of `events`.
pub fn run_alignment(
    index: &TrackIndex,
    events: &[Event],
    options: &AlignOptions,
) -> TrackResult<AlignmentReport> {
    if index.is_empty() {
        return Err(TrackError::EmptyIndex);
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("alignment", run_id = %run_id);
    let _guard = span.enter();

    let matcher = NearestMatcher::new(index);
    let workers = options.workers.clamp(1, events.len().max(1));

    let outcomes = if workers == 1 {
        align_batch(matcher, events, options)?
    } else {
        let chunk_size = events.len().div_ceil(workers);
        tracing::debug!(workers, chunk_size, "Aligning events in parallel");

        std::thread::scope(|s| {
            let handles: Vec<_> = events
                .chunks(chunk_size)
                .map(|batch| s.spawn(move || align_batch(matcher, batch, options)))
                .collect();

            let mut outcomes = Vec::with_capacity(events.len());
            for handle in handles {
                let batch = handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
                outcomes.extend(batch);
            }
            Ok::<_, TrackError>(outcomes)
        })?
    };

    let count = |label: &str| outcomes.iter().filter(|o| o.outcome.label() == label).count();
    let report = AlignmentReport {
        run_id,
        threshold_secs: options.threshold.as_secs_f64(),
        offset: options.offset.map(format_offset),
        track_points: index.len(),
        matched: count("matched"),
        rejected: count("rejected"),
        skipped: count("skipped"),
        outcomes,
    };

    tracing::info!(
        matched = report.matched,
        rejected = report.rejected,
        skipped = report.skipped,
        "Alignment completed"
    );

    Ok(report)
}

fn align_batch(
    matcher: NearestMatcher<'_>,
    events: &[Event],
    options: &AlignOptions,
) -> TrackResult<Vec<EventOutcome>> {
    events
        .iter()
        .map(|event| {
            Ok(EventOutcome {
                event: event.clone(),
                outcome: align_one(matcher, event, options)?,
            })
        })
        .collect()
}

fn align_one(
    matcher: NearestMatcher<'_>,
    event: &Event,
    options: &AlignOptions,
) -> TrackResult<Outcome> {
    if event.has_location() && !options.include_located {
        return Ok(Outcome::Skipped);
    }

    let result = matcher.find(event.timestamp, options.offset)?;

    if options.threshold.accepts(&result) {
        tracing::debug!(
            event = %event.name,
            gap_seconds = result.gap_seconds,
            latitude = result.sample.latitude,
            longitude = result.sample.longitude,
            "Found location match"
        );
        Ok(Outcome::Matched { result })
    } else {
        Ok(Outcome::Rejected { nearest: result })
    }
}
