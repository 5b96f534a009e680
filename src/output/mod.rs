//! Report output
//!
//! Renders the collected records and their aggregates. Rendering only starts
//! after a run has fully succeeded, so a failed run never prints a partial
//! report.

pub mod json;
pub mod text;

use crate::config::OutputFormat;
use crate::coordinator::RunOutcome;
use crate::error::ReportError;
use std::io::{self, Write};

/// Write the report for `outcome` in the requested format
pub fn write_report<W: Write>(
    out: &mut W,
    format: OutputFormat,
    outcome: &RunOutcome,
) -> Result<(), ReportError> {
    let rendered = match format {
        OutputFormat::Text => text::write_text(out, &outcome.records, &outcome.aggregates),
        OutputFormat::Json => {
            json::write_json(out, outcome.regions, &outcome.records, &outcome.aggregates)
        }
    };

    rendered.and_then(|()| out.flush()).map_err(ReportError::Output)
}

/// Write the report to standard output
pub fn print_report(format: OutputFormat, outcome: &RunOutcome) -> Result<(), ReportError> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    write_report(&mut out, format, outcome)
}
