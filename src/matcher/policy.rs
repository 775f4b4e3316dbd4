//! Acceptance policy
//!
//! A match is usable only when its gap is strictly below the threshold.
//! A gap exactly equal to the threshold is rejected.

use crate::matcher::MatchResult;
use serde::Serialize;

/// Default acceptance threshold in seconds
pub const DEFAULT_DELTA_SECS: u64 = 60;

/// Decide whether a match is close enough: `gap_seconds < delta_seconds`
pub fn accept(result: &MatchResult, delta_seconds: f64) -> bool {
    result.gap_seconds < delta_seconds
}

/// Maximum allowed gap between an event and its track sample
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Threshold {
    secs: f64,
}

impl Threshold {
    pub fn from_secs(secs: u64) -> Self {
        Self { secs: secs as f64 }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.secs
    }

    /// Apply [`accept`] with this threshold
    pub fn accepts(&self, result: &MatchResult) -> bool {
        accept(result, self.secs)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::from_secs(DEFAULT_DELTA_SECS)
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.secs)
    }
}
