//! JSON output formatting

use crate::protocol::RegionRecord;
use crate::stats::RegionAggregates;
use serde::Serialize;
use std::io::{self, Write};

/// Complete JSON report
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// RFC 3339 UTC time the report was produced
    pub generated_at: String,
    pub regions_requested: u32,
    pub summary: &'a RegionAggregates,
    /// Per-region records in arrival order
    pub regions: &'a [RegionRecord],
}

impl<'a> JsonReport<'a> {
    pub fn new(
        regions_requested: u32,
        records: &'a [RegionRecord],
        aggregates: &'a RegionAggregates,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            regions_requested,
            summary: aggregates,
            regions: records,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn write_json<W: Write>(
    out: &mut W,
    regions_requested: u32,
    records: &[RegionRecord],
    aggregates: &RegionAggregates,
) -> io::Result<()> {
    let report = JsonReport::new(regions_requested, records, aggregates);
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}
