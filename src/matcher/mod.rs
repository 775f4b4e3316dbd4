//! Trackmatch Matching
//!
//! Nearest-in-time search and the acceptance decision:
//!
//! - **nearest**: `NearestMatcher` and `MatchResult`
//! - **policy**: `accept` / `Threshold` (strict `gap < delta`)
//! - **offset**: Parsing user-supplied clock-skew offsets
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use trackmatch::matcher::{accept, NearestMatcher};
//! use trackmatch::track::{RawTrackRecord, TrackIndex};
//!
//! let at = |s| Utc.timestamp_opt(s, 0).unwrap();
//! let index = TrackIndex::from_records(vec![
//!     RawTrackRecord::new(at(1000), 47.50, -122.20),
//!     RawTrackRecord::new(at(1060), 47.55, -122.25),
//!     RawTrackRecord::new(at(1120), 47.60, -122.30),
//! ])
//! .unwrap();
//!
//! let matcher = NearestMatcher::new(&index);
//!
//! let hit = matcher.find(at(1090), None).unwrap();
//! assert_eq!(hit.gap_seconds, 30.0);
//! assert!(accept(&hit, 60.0));
//!
//! let skewed = matcher.find(at(1000), Some(Duration::seconds(200))).unwrap();
//! assert_eq!(skewed.gap_seconds, 80.0);
//! assert!(!accept(&skewed, 60.0));
//! ```

mod nearest;
mod offset;
mod policy;

pub use nearest::{apply_offset, MatchResult, NearestMatcher};
pub use offset::{format_offset, parse_offset, OffsetParseError};
pub use policy::{accept, Threshold, DEFAULT_DELTA_SECS};
