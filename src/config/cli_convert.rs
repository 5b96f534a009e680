//! CLI to Config conversion utilities

use crate::config::{self, cli};
use crate::error::ReportError;
use anyhow::{Context, Result};

/// Parse the region count argument
///
/// Only ASCII decimal digits are accepted (no sign, no whitespace), and the
/// value must be between 1 and `i32::MAX` so every region id fits the record's
/// 32-bit field.
pub fn parse_region_count(s: &str) -> std::result::Result<u32, ReportError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReportError::InvalidArgument(format!(
            "invalid number of regions: {:?} (expected decimal digits)",
            s
        )));
    }

    let regions: u32 = s
        .parse()
        .ok()
        .filter(|&n| n <= i32::MAX as u32)
        .ok_or_else(|| ReportError::InvalidArgument(format!("number of regions too large: {}", s)))?;

    if regions == 0 {
        return Err(ReportError::InvalidArgument(
            "number of regions must be at least 1".to_string(),
        ));
    }

    Ok(regions)
}

/// Parse a duration string (e.g., "500ms", "30s", "2m", "1h") to milliseconds
///
/// A bare number is taken as seconds.
pub fn parse_duration_ms(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1u64)
    } else if let Some(n) = s.strip_suffix("s") {
        (n, 1000)
    } else if let Some(n) = s.strip_suffix("m") {
        (n, 60 * 1000)
    } else if let Some(n) = s.strip_suffix("h") {
        (n, 3600 * 1000)
    } else {
        (s.as_str(), 1000)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Duration out of range: {}", s))
}

/// Convert CLI ChannelMode to config ChannelMode
pub fn convert_channel_mode(mode: cli::ChannelMode) -> config::ChannelMode {
    match mode {
        cli::ChannelMode::Shared => config::ChannelMode::Shared,
        cli::ChannelMode::PerWorker => config::ChannelMode::PerWorker,
    }
}

/// Convert CLI ReportFormat to config OutputFormat
pub fn convert_report_format(format: cli::ReportFormat) -> config::OutputFormat {
    match format {
        cli::ReportFormat::Text => config::OutputFormat::Text,
        cli::ReportFormat::Json => config::OutputFormat::Json,
    }
}
