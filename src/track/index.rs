//! Track Index - sorted, binary-searchable view over track samples
//!
//! Built once from the records a track reader produced, read-only afterwards.
//! Keeps a parallel vector of timestamps so searches touch only the key.
//!
//! # Ingestion
//! - Records without a timestamp are dropped (counted in [`TrackIndex::dropped`])
//! - Records with a timestamp must carry valid coordinates
//! - Samples are stable-sorted by timestamp: equal timestamps keep input order
//!
//! An empty index is a valid value. Only lookups that need a sample fail on it.

use crate::track::{RawTrackRecord, TimeSpan, TrackError, TrackResult, TrackSample};
use chrono::{DateTime, Utc};

/// Ordered collection of track samples
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    /// Samples, non-decreasing by timestamp
    samples: Vec<TrackSample>,
    /// `timestamps[i] == samples[i].timestamp`
    timestamps: Vec<DateTime<Utc>>,
    /// Records filtered out for lacking a timestamp
    dropped: usize,
}

impl TrackIndex {
    /// Build an index from raw reader output
    ///
    /// Fails only on malformed timestamped records; the error names the
    /// record's position in `records`.
    pub fn from_records<I>(records: I) -> TrackResult<Self>
    where
        I: IntoIterator<Item = RawTrackRecord>,
    {
        let mut samples = Vec::new();
        let mut dropped = 0;

        for (position, record) in records.into_iter().enumerate() {
            let Some(timestamp) = record.timestamp else {
                dropped += 1;
                continue;
            };

            let latitude = validate_coordinate(position, "latitude", record.latitude, 90.0)?;
            let longitude = validate_coordinate(position, "longitude", record.longitude, 180.0)?;
            samples.push(TrackSample::new(timestamp, latitude, longitude));
        }

        let mut index = Self::from_samples(samples);
        index.dropped = dropped;

        tracing::debug!(
            samples = index.len(),
            dropped = index.dropped,
            "Built track index"
        );

        Ok(index)
    }

    /// Build an index from samples that are already valid
    pub fn from_samples(mut samples: Vec<TrackSample>) -> Self {
        // `sort_by_key` is stable
        samples.sort_by_key(|s| s.timestamp);
        let timestamps = samples.iter().map(|s| s.timestamp).collect();

        Self {
            samples,
            timestamps,
            dropped: 0,
        }
    }

    /// Number of indexed samples
    pub fn size(&self) -> usize {
        self.samples.len()
    }

    /// Same as [`TrackIndex::size`]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of input records dropped for lacking a timestamp
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Earliest sample
    pub fn first(&self) -> TrackResult<&TrackSample> {
        self.samples.first().ok_or(TrackError::EmptyIndex)
    }

    /// Latest sample
    pub fn last(&self) -> TrackResult<&TrackSample> {
        self.samples.last().ok_or(TrackError::EmptyIndex)
    }

    /// All samples in ascending time order
    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    /// Search keys, parallel to [`TrackIndex::samples`]
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Time covered from first to last sample
    pub fn span(&self) -> TrackResult<TimeSpan> {
        Ok(TimeSpan {
            start: self.first()?.timestamp,
            end: self.last()?.timestamp,
        })
    }

    /// Left-bisect: first position whose timestamp is >= `instant`
    pub fn insertion_point(&self, instant: DateTime<Utc>) -> usize {
        self.timestamps.partition_point(|t| *t < instant)
    }
}

fn validate_coordinate(
    position: usize,
    field: &str,
    value: Option<f64>,
    limit: f64,
) -> TrackResult<f64> {
    let value = value.ok_or_else(|| TrackError::InvalidInput {
        position,
        reason: format!("missing {}", field),
    })?;

    if !value.is_finite() || value.abs() > limit {
        return Err(TrackError::InvalidInput {
            position,
            reason: format!("{} {} outside [-{}, {}]", field, value, limit, limit),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn record(secs: i64, lat: f64) -> RawTrackRecord {
        RawTrackRecord::new(at(secs), lat, 10.0)
    }

    #[test]
    fn test_build_sorts_by_timestamp() {
        let index = TrackIndex::from_records(vec![
            record(300, 1.0),
            record(100, 2.0),
            record(200, 3.0),
        ])
        .unwrap();

        let secs: Vec<i64> = index.timestamps().iter().map(|t| t.timestamp()).collect();
        assert_eq!(secs, vec![100, 200, 300]);

        for w in index.samples().windows(2) {
            assert!(w[0].timestamp <= w[1].timestamp);
        }
        for (sample, ts) in index.samples().iter().zip(index.timestamps()) {
            assert_eq!(sample.timestamp, *ts);
        }
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let index = TrackIndex::from_records(vec![
            record(200, 1.0),
            record(100, 2.0),
            record(200, 3.0),
            record(200, 4.0),
        ])
        .unwrap();

        let lats: Vec<f64> = index.samples().iter().map(|s| s.latitude).collect();
        assert_eq!(lats, vec![2.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_untimed_records_are_dropped() {
        let records = vec![
            record(100, 1.0),
            RawTrackRecord::untimed(5.0, 5.0),
            record(50, 2.0),
            RawTrackRecord::default(),
        ];

        let index = TrackIndex::from_records(records).unwrap();

        assert_eq!(index.size(), 2);
        assert_eq!(index.dropped(), 2);
        assert!(index.samples().iter().all(|s| s.latitude != 5.0));
    }

    #[test]
    fn test_all_untimed_gives_empty_index() {
        let index = TrackIndex::from_records(vec![RawTrackRecord::untimed(1.0, 1.0)]).unwrap();

        assert!(index.is_empty());
        assert_eq!(index.size(), 0);
        assert_eq!(index.dropped(), 1);
    }

    #[test]
    fn test_empty_index() {
        let index = TrackIndex::from_records(Vec::new()).unwrap();

        assert_eq!(index.size(), 0);
        assert_eq!(index.first(), Err(TrackError::EmptyIndex));
        assert_eq!(index.last(), Err(TrackError::EmptyIndex));
        assert_eq!(index.span(), Err(TrackError::EmptyIndex));
    }

    #[test]
    fn test_first_last_and_span() {
        let index =
            TrackIndex::from_records(vec![record(500, 1.0), record(100, 2.0), record(300, 3.0)])
                .unwrap();

        assert_eq!(index.first().unwrap().timestamp, at(100));
        assert_eq!(index.last().unwrap().timestamp, at(500));
        assert_eq!(index.span().unwrap().duration(), chrono::Duration::seconds(400));
    }

    #[test]
    fn test_missing_coordinate_is_invalid() {
        let records = vec![
            record(100, 1.0),
            RawTrackRecord {
                timestamp: Some(at(200)),
                latitude: Some(1.0),
                longitude: None,
            },
        ];

        let err = TrackIndex::from_records(records).unwrap_err();
        assert_eq!(
            err,
            TrackError::InvalidInput {
                position: 1,
                reason: "missing longitude".to_string(),
            }
        );
    }

    #[test]
    fn test_out_of_range_coordinate_is_invalid() {
        let err = TrackIndex::from_records(vec![record(100, 91.0)]).unwrap_err();
        assert!(matches!(err, TrackError::InvalidInput { position: 0, .. }));

        let err = TrackIndex::from_records(vec![record(100, f64::NAN)]).unwrap_err();
        assert!(matches!(err, TrackError::InvalidInput { position: 0, .. }));
    }

    #[test]
    fn test_untimed_record_skips_validation() {
        // Coordinates of dropped records are never inspected
        let records = vec![RawTrackRecord::default(), record(100, 1.0)];
        let index = TrackIndex::from_records(records).unwrap();
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn test_insertion_point_is_left_bisect() {
        let index = TrackIndex::from_records(vec![
            record(100, 0.0),
            record(110, 0.0),
            record(110, 0.0),
            record(130, 0.0),
        ])
        .unwrap();

        assert_eq!(index.insertion_point(at(50)), 0);
        assert_eq!(index.insertion_point(at(100)), 0);
        assert_eq!(index.insertion_point(at(110)), 1);
        assert_eq!(index.insertion_point(at(120)), 3);
        assert_eq!(index.insertion_point(at(200)), 4);
    }

    #[test]
    fn test_index_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrackIndex>();
    }
}
