//! Event Alignment
//!
//! Batch orchestration on top of the matcher:
//!
//! - **run**: Align a list of events, optionally across worker threads
//! - **report**: Table/JSON/CSV rendering and match export

mod report;
mod run;

pub use report::{
    export_matches, pluralize, render, render_table, summary_line, write_csv, OutputFormat,
};
pub use run::{run_alignment, AlignOptions, AlignmentReport, EventOutcome, Outcome};
