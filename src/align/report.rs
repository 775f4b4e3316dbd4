//! Report rendering
//!
//! Formats an [`AlignmentReport`] as a table, JSON or CSV, and exports the
//! matched events as CSV rows.

use crate::align::{AlignmentReport, EventOutcome};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Unknown output format: {}. Use: table, json, csv",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// One flattened CSV row
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    timestamp: String,
    status: &'static str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    track_time: Option<String>,
    gap_seconds: Option<f64>,
}

impl<'a> From<&'a EventOutcome> for CsvRow<'a> {
    fn from(o: &'a EventOutcome) -> Self {
        let nearest = o.outcome.nearest();
        Self {
            name: &o.event.name,
            timestamp: o.event.timestamp.to_rfc3339(),
            status: o.outcome.label(),
            latitude: nearest.map(|r| r.sample.latitude),
            longitude: nearest.map(|r| r.sample.longitude),
            track_time: nearest.map(|r| r.sample.timestamp.to_rfc3339()),
            gap_seconds: nearest.map(|r| r.gap_seconds),
        }
    }
}

/// Exported location assignment for a matched event
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    name: &'a str,
    timestamp: String,
    latitude: f64,
    longitude: f64,
    gap_seconds: f64,
}

/// Render the report in the requested format
pub fn render(report: &AlignmentReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(report, &mut buf)?;
            Ok(String::from_utf8(buf)?)
        }
    }
}

/// Human-readable table with a summary line
pub fn render_table(report: &AlignmentReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<24} {:<26} {:<9} {:>11} {:>12} {:>8}\n",
        "Name", "Timestamp", "Status", "Latitude", "Longitude", "Gap (s)"
    ));
    out.push_str(&format!("{}\n", "-".repeat(95)));

    for o in &report.outcomes {
        let nearest = o.outcome.nearest();
        let cell = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "{:<24} {:<26} {:<9} {:>11} {:>12} {:>8}\n",
            o.event.name,
            o.event.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            o.outcome.label(),
            cell(nearest.map(|r| format!("{:.6}", r.sample.latitude))),
            cell(nearest.map(|r| format!("{:.6}", r.sample.longitude))),
            cell(nearest.map(|r| format!("{:.0}", r.gap_seconds))),
        ));
    }

    out.push('\n');
    out.push_str(&summary_line(report));
    out.push('\n');
    out
}

/// e.g. "Matched 3 of 5 photos (1 rejected, 1 skipped)"
pub fn summary_line(report: &AlignmentReport) -> String {
    format!(
        "Matched {} of {} {} ({} rejected, {} skipped)",
        report.matched,
        report.total(),
        pluralize(report.total(), "photo", "photos"),
        report.rejected,
        report.skipped
    )
}

/// Write every outcome as a CSV row
pub fn write_csv<W: Write>(report: &AlignmentReport, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for o in &report.outcomes {
        wtr.serialize(CsvRow::from(o))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write only matched events with their assigned coordinates
pub fn export_matches<W: Write>(report: &AlignmentReport, writer: W) -> csv::Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;

    for (event, result) in report.matches() {
        wtr.serialize(ExportRow {
            name: &event.name,
            timestamp: event.timestamp.to_rfc3339(),
            latitude: result.sample.latitude,
            longitude: result.sample.longitude,
            gap_seconds: result.gap_seconds,
        })?;
        written += 1;
    }

    wtr.flush()?;
    Ok(written)
}

/// Pick the singular or plural noun for a count
pub fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}
