//! Input Sources
//!
//! Readers that feed the alignment core:
//! - GPX tracks (plain `.gpx` or a `.zip` of GPX files)
//! - CSV event lists (photo name + capture time)
//!
//! Readers only decode. Validation and ordering of track points happen in
//! [`crate::track::TrackIndex`].

mod events;
mod gpx;

pub use events::{parse_timestamp, read_events_file, read_events_str, Event, EventLoad};
pub use gpx::{read_gpx_file, read_gpx_str, read_track_file, TrackLoad};

/// Errors that can occur while reading input files
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("ZIP error: {0}")]
    Zip(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported track file: {0}")]
    Unsupported(String),
}

impl From<zip::result::ZipError> for SourceError {
    fn from(err: zip::result::ZipError) -> Self {
        SourceError::Zip(err.to_string())
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Xml(err.to_string())
    }
}
