//! Track Storage
//!
//! In-memory representation of a GPS track:
//!
//! - **types**: Samples, raw reader records, time spans
//! - **index**: Sorted, binary-searchable sample index
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use trackmatch::track::{RawTrackRecord, TrackIndex};
//!
//! let records = vec![
//!     RawTrackRecord::new(Utc.timestamp_opt(1060, 0).unwrap(), 47.6, -122.3),
//!     RawTrackRecord::new(Utc.timestamp_opt(1000, 0).unwrap(), 47.5, -122.2),
//!     RawTrackRecord::untimed(0.0, 0.0),
//! ];
//!
//! let index = TrackIndex::from_records(records).unwrap();
//! assert_eq!(index.size(), 2);
//! assert_eq!(index.dropped(), 1);
//! ```

pub mod error;
pub mod index;
pub mod types;

pub use error::{TrackError, TrackResult};
pub use index::TrackIndex;
pub use types::{abs_gap, duration_secs, RawTrackRecord, TimeSpan, TrackSample};
