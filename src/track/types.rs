//! Core data types for track alignment
//!
//! - `TrackSample`: A single geolocated, timestamped point
//! - `RawTrackRecord`: What a track-file reader hands over before validation
//! - `TimeSpan`: Earliest/latest instants covered by a track

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single point from a recorded path
///
/// Immutable once created. Two samples are equal when all fields are equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrackSample {
    /// When the point was recorded (UTC)
    pub timestamp: DateTime<Utc>,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl TrackSample {
    /// Create a new sample
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for TrackSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.timestamp.to_rfc3339(),
            self.latitude,
            self.longitude
        )
    }
}

/// An unvalidated record as produced by a track reader
///
/// Any field may be missing. Records without a timestamp are dropped when
/// the index is built; records with a timestamp must carry valid coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawTrackRecord {
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RawTrackRecord {
    /// Create a record with all fields present
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Create a record that has coordinates but no timestamp
    pub fn untimed(latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp: None,
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

/// Closed time interval `[start, end]` covered by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSpan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSpan {
    /// Length of the span
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Absolute distance between two instants as an exact duration
pub fn abs_gap(a: DateTime<Utc>, b: DateTime<Utc>) -> Duration {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

/// Convert a non-negative duration to fractional seconds
pub fn duration_secs(d: Duration) -> f64 {
    d.num_seconds() as f64 + f64::from(d.subsec_nanos()) / 1_000_000_000.0
}
