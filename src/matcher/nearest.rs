//! Nearest Matcher - nearest-in-time lookup over a track index
//!
//! Per query:
//! 1. Shift the query by the optional offset
//! 2. Left-bisect the timestamp vector for the insertion point `i`
//! 3. Compare candidates `i-1, i, i+1` (clamped) in ascending index order
//! 4. Keep the closest; on a tie the earlier sample wins
//!
//! # Performance
//! - O(log n) per query, no allocation

use crate::matcher::Threshold;
use crate::track::{abs_gap, duration_secs, TrackError, TrackIndex, TrackResult, TrackSample};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Closest sample found for a query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    /// The selected track sample
    pub sample: TrackSample,
    /// `|sample.timestamp - effective_time|` in seconds, always >= 0
    pub gap_seconds: f64,
    /// Instant actually searched (query time plus offset)
    pub effective_time: DateTime<Utc>,
    #[serde(skip)]
    gap: Duration,
}

impl MatchResult {
    fn new(sample: TrackSample, effective_time: DateTime<Utc>) -> Self {
        let gap = abs_gap(sample.timestamp, effective_time);
        Self {
            sample,
            gap_seconds: duration_secs(gap),
            effective_time,
            gap,
        }
    }

    /// Exact gap as a duration
    pub fn gap(&self) -> Duration {
        self.gap
    }
}

/// Finds the nearest track sample for arbitrary instants
///
/// Borrows one index for its whole lifetime. Cheap to create and `Copy`,
/// so each worker thread can hold its own.
#[derive(Debug, Clone, Copy)]
pub struct NearestMatcher<'a> {
    index: &'a TrackIndex,
}

impl<'a> NearestMatcher<'a> {
    /// Create a matcher over an index
    pub fn new(index: &'a TrackIndex) -> Self {
        Self { index }
    }

    /// Find the sample nearest to `query_time + offset`
    ///
    /// `None` means no adjustment. Fails with [`TrackError::EmptyIndex`] when
    /// there is nothing to search.
    pub fn find(
        &self,
        query_time: DateTime<Utc>,
        offset: Option<Duration>,
    ) -> TrackResult<MatchResult> {
        let effective_time = apply_offset(query_time, offset)?;
        self.find_exact(effective_time)
    }

    /// Find the sample nearest to an already adjusted instant
    pub fn find_exact(&self, effective_time: DateTime<Utc>) -> TrackResult<MatchResult> {
        let samples = self.index.samples();
        let last = samples.len().checked_sub(1).ok_or(TrackError::EmptyIndex)?;

        let i = self.index.insertion_point(effective_time);
        let lo = i.saturating_sub(1);
        let hi = (i + 1).min(last);

        let mut best = lo;
        let mut best_gap = abs_gap(effective_time, samples[lo].timestamp);

        for (k, sample) in samples[lo..=hi].iter().enumerate().skip(1) {
            let gap = abs_gap(effective_time, sample.timestamp);
            // Strict: equidistant later candidates never replace an earlier one
            if gap < best_gap {
                best = lo + k;
                best_gap = gap;
            }
        }

        // Ties among equal timestamps go to the first one in stable order,
        // which may sit outside the window when the query comes from above
        best = self.index.insertion_point(samples[best].timestamp);

        Ok(MatchResult::new(samples[best], effective_time))
    }

    /// Find and apply the acceptance policy
    ///
    /// `Ok(None)` means the track was searched but nothing was close enough,
    /// which is distinct from the `EmptyIndex` error.
    pub fn find_accepted(
        &self,
        query_time: DateTime<Utc>,
        offset: Option<Duration>,
        threshold: Threshold,
    ) -> TrackResult<Option<MatchResult>> {
        let result = self.find(query_time, offset)?;
        Ok(threshold.accepts(&result).then_some(result))
    }
}

/// Compute `query_time + offset`, treating `None` as zero
pub fn apply_offset(
    query_time: DateTime<Utc>,
    offset: Option<Duration>,
) -> TrackResult<DateTime<Utc>> {
    match offset {
        None => Ok(query_time),
        Some(offset) => query_time.checked_add_signed(offset).ok_or_else(|| {
            TrackError::TimeOutOfRange(format!("{} shifted by {}", query_time, offset))
        }),
    }
}
