//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::cli_convert;

/// Channel wiring selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelMode {
    /// One pipe shared by all workers
    Shared,
    /// One pipe per worker, merged in launch order
    PerWorker,
}

/// Report format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text
    Text,
    /// JSON document
    Json,
}

/// Region report - per-region sensor statistics, one worker process per region
#[derive(Parser, Debug)]
#[command(name = "region-report")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Number of regions (decimal digits only, at least 1)
    #[arg(value_name = "REGIONS", value_parser = cli_convert::parse_region_count)]
    pub regions: u32,

    /// Worker executable [default: ./stats]
    #[arg(long, env = "REGION_REPORT_WORKER")]
    pub worker: Option<PathBuf>,

    /// Sensor data file passed to every worker [default: sensor_data.bin]
    #[arg(long, env = "REGION_REPORT_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// How worker output reaches the coordinator [default: shared]
    #[arg(long, value_enum)]
    pub channel: Option<ChannelMode>,

    /// Give up if workers have not delivered and exited in time (e.g. 500ms, 30s, 2m)
    #[arg(long)]
    pub timeout: Option<String>,

    /// Report format [default: text]
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse arguments without exiting on error
    ///
    /// The caller decides the exit status for usage errors.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}
