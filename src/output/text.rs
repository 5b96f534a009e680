//! Human-readable text output

use crate::protocol::RegionRecord;
use crate::stats::RegionAggregates;
use std::io::{self, Write};

/// Unit suffix appended to every temperature
const UNIT: &str = "°C";

/// Write the summary lines followed by one block per region (arrival order)
pub fn write_text<W: Write>(
    out: &mut W,
    records: &[RegionRecord],
    aggregates: &RegionAggregates,
) -> io::Result<()> {
    writeln!(
        out,
        "Region {} recorded the highest value: {} {};",
        aggregates.highest_value.region_id, aggregates.highest_value.value, UNIT
    )?;
    writeln!(
        out,
        "Region {} recorded the lowest value: {} {};",
        aggregates.lowest_value.region_id, aggregates.lowest_value.value, UNIT
    )?;
    writeln!(
        out,
        "Region {} recorded the highest average: {} {};",
        aggregates.highest_average.region_id,
        format_average(aggregates.highest_average.value),
        UNIT
    )?;
    writeln!(
        out,
        "Region {} recorded the lowest average: {} {};",
        aggregates.lowest_average.region_id,
        format_average(aggregates.lowest_average.value),
        UNIT
    )?;

    for record in records {
        write_region(out, record)?;
    }

    Ok(())
}

fn write_region<W: Write>(out: &mut W, record: &RegionRecord) -> io::Result<()> {
    writeln!(out, "Region {}:", record.region_id)?;
    writeln!(out, "* Average: {} {}", format_average(record.average), UNIT)?;
    writeln!(out, "* Median: {} {}", record.median, UNIT)?;
    writeln!(out, "* Maximum: {} {}", record.max, UNIT)?;
    writeln!(out, "* Minimum: {} {}", record.min, UNIT)
}

/// Format an average with exactly one decimal digit
pub fn format_average(value: f32) -> String {
    format!("{:.1}", value)
}
