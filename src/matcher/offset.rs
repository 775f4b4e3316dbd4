//! Offset parsing
//!
//! Turns user-supplied clock-skew corrections into signed durations.
//!
//! Accepted forms:
//! - Plain seconds: `"3600"`, `"-90"`
//! - Clock style: `"+02:00"`, `"-05:30"`, `"01:00:30"`
//! - Units: `"2h"`, `"-1h30m"`, `"+1d2h3m4s"`

use chrono::Duration;
use thiserror::Error;

/// Errors from parsing an offset string
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OffsetParseError {
    #[error("Empty offset")]
    Empty,

    #[error("Cannot parse offset: {0}")]
    Invalid(String),

    #[error("Offset too large: {0}")]
    Overflow(String),
}

/// Parse an offset string into a signed duration
pub fn parse_offset(s: &str) -> Result<Duration, OffsetParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(OffsetParseError::Empty);
    }

    let (negative, body) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let secs = if body.bytes().all(|b| b.is_ascii_digit()) && !body.is_empty() {
        parse_component(body, s)?
    } else if let Some(secs) = parse_clock(body, s)? {
        secs
    } else if let Some(secs) = parse_units(body, s)? {
        secs
    } else {
        return Err(OffsetParseError::Invalid(s.to_string()));
    };

    let secs = if negative { -secs } else { secs };
    Duration::try_seconds(secs).ok_or_else(|| OffsetParseError::Overflow(s.to_string()))
}

/// `HH:MM` or `HH:MM:SS`
fn parse_clock(body: &str, original: &str) -> Result<Option<i64>, OffsetParseError> {
    let re = regex::Regex::new(r"^(\d{1,3}):([0-5]\d)(?::([0-5]\d))?$")
        .map_err(|e| OffsetParseError::Invalid(e.to_string()))?;

    let Some(caps) = re.captures(body) else {
        return Ok(None);
    };

    let hours = parse_component(&caps[1], original)?;
    let minutes = parse_component(&caps[2], original)?;
    let seconds = match caps.get(3) {
        Some(m) => parse_component(m.as_str(), original)?,
        None => 0,
    };

    Ok(Some(hours * 3600 + minutes * 60 + seconds))
}

/// Any non-empty combination of `Nd`, `Nh`, `Nm`, `Ns` in that order
fn parse_units(body: &str, original: &str) -> Result<Option<i64>, OffsetParseError> {
    let re = regex::Regex::new(r"^(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?$")
        .map_err(|e| OffsetParseError::Invalid(e.to_string()))?;

    let lowered = body.to_lowercase();
    let Some(caps) = re.captures(&lowered) else {
        return Ok(None);
    };

    let mut total: i64 = 0;
    let mut matched = false;

    for (group, scale) in [(1, 86_400), (2, 3600), (3, 60), (4, 1)] {
        if let Some(m) = caps.get(group) {
            matched = true;
            total = parse_component(m.as_str(), original)?
                .checked_mul(scale)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(|| OffsetParseError::Overflow(original.to_string()))?;
        }
    }

    Ok(matched.then_some(total))
}

fn parse_component(digits: &str, original: &str) -> Result<i64, OffsetParseError> {
    digits
        .parse::<i64>()
        .map_err(|_| OffsetParseError::Overflow(original.to_string()))
}

/// Render an offset the way [`parse_offset`] reads it back, e.g. `-1h30m`
pub fn format_offset(offset: Duration) -> String {
    let total = offset.num_seconds();
    if total == 0 {
        return "0s".to_string();
    }

    let sign = if total < 0 { "-" } else { "+" };
    let mut rest = total.unsigned_abs();
    let mut out = String::from(sign);

    for (unit, scale) in [("d", 86_400u64), ("h", 3600), ("m", 60), ("s", 1)] {
        let n = rest / scale;
        rest %= scale;
        if n > 0 {
            out.push_str(&format!("{}{}", n, unit));
        }
    }

    out
}
