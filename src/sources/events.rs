//! CSV Event Lists
//!
//! Events to align, one per row. Columns are found by header name:
//!
//! | Column      | Header names accepted                      | Required |
//! |-------------|--------------------------------------------|----------|
//! | name        | `name`, `filename`, `file`, `photo`        | yes      |
//! | timestamp   | `timestamp`, `datetime`, `date`, `time`    | yes      |
//! | latitude    | `latitude`, `lat`                          | no       |
//! | longitude   | `longitude`, `lon`, `lng`                  | no       |
//!
//! Rows that fail to parse are reported per line and skipped.

use super::SourceError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Maximum number of row errors kept in an [`EventLoad`]
const MAX_ERRORS: usize = 100;

/// Something with a capture time that needs a location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    /// Location already known for this event, as `(latitude, longitude)`
    pub location: Option<(f64, f64)>,
}

impl Event {
    pub fn new(name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            timestamp,
            location: None,
        }
    }

    /// Builder: set an existing location
    pub fn located(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some((latitude, longitude));
        self
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

/// Result of reading an event list
#[derive(Debug, Default)]
pub struct EventLoad {
    pub events: Vec<Event>,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Column positions resolved from the header row
struct Columns {
    name: usize,
    timestamp: usize,
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl Columns {
    fn detect(headers: &csv::StringRecord) -> Result<Self, SourceError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };

        let name = find(&["name", "filename", "file", "photo"])
            .ok_or_else(|| SourceError::Parse("missing name column".to_string()))?;
        let timestamp = find(&["timestamp", "datetime", "date", "time"])
            .ok_or_else(|| SourceError::Parse("missing timestamp column".to_string()))?;

        Ok(Self {
            name,
            timestamp,
            latitude: find(&["latitude", "lat"]),
            longitude: find(&["longitude", "lon", "lng"]),
        })
    }

    fn parse_row(&self, record: &csv::StringRecord) -> Result<Event, String> {
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

        let name = field(self.name);
        if name.is_empty() {
            return Err("empty name".to_string());
        }

        let ts_str = field(self.timestamp);
        if ts_str.is_empty() {
            return Err("missing timestamp".to_string());
        }
        let timestamp = parse_timestamp(ts_str).map_err(|e| e.to_string())?;

        let mut event = Event::new(name, timestamp);

        if let (Some(lat_idx), Some(lon_idx)) = (self.latitude, self.longitude) {
            let (lat, lon) = (field(lat_idx), field(lon_idx));
            if !lat.is_empty() && !lon.is_empty() {
                let lat: f64 = lat
                    .parse()
                    .map_err(|_| format!("invalid latitude: {}", lat))?;
                let lon: f64 = lon
                    .parse()
                    .map_err(|_| format!("invalid longitude: {}", lon))?;
                event = event.located(lat, lon);
            }
        }

        Ok(event)
    }
}

/// Parse a timestamp string into UTC
///
/// Offset-carrying RFC 3339 values are converted; naive values (including
/// EXIF-style `2024:01:15 10:30:00`) are taken as UTC.
pub fn parse_timestamp(ts_str: &str) -> Result<DateTime<Utc>, SourceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts_str) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y:%m:%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts_str, fmt) {
            return Ok(dt.and_utc());
        }
    }

    Err(SourceError::Parse(format!(
        "Could not parse timestamp: {}",
        ts_str
    )))
}

/// Read events from a CSV file
pub fn read_events_file(path: &Path) -> Result<EventLoad, SourceError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    read_events(reader)
}

/// Read events from CSV text (useful for testing)
pub fn read_events_str(csv_data: &str) -> Result<EventLoad, SourceError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    read_events(reader)
}

fn read_events<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<EventLoad, SourceError> {
    let columns = Columns::detect(reader.headers()?)?;
    let mut load = EventLoad::default();

    for (line_num, result) in reader.records().enumerate() {
        // Header is line 1
        let actual_line = line_num + 2;

        let outcome = result
            .map_err(|e| e.to_string())
            .and_then(|record| columns.parse_row(&record));

        match outcome {
            Ok(event) => load.events.push(event),
            Err(e) => {
                load.rows_failed += 1;
                if load.errors.len() < MAX_ERRORS {
                    load.errors.push(format!("Line {}: {}", actual_line, e));
                }
            }
        }
    }

    if load.rows_failed > MAX_ERRORS {
        load.errors.push(format!(
            "... and {} more errors",
            load.rows_failed - MAX_ERRORS
        ));
    }

    Ok(load)
}
