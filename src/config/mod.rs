//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! The effective configuration is the TOML file (if any) with explicitly given
//! CLI flags layered on top; the region count always comes from the command
//! line.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::cli::Cli;

/// Default worker executable, resolved relative to the working directory
pub const DEFAULT_WORKER_PROGRAM: &str = "./stats";

/// Default sensor data file handed to every worker
pub const DEFAULT_DATA_FILE: &str = "sensor_data.bin";

/// Complete run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Number of regions, one worker each
    #[serde(skip)]
    pub regions: u32,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How workers are started
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Worker executable
    #[serde(default = "default_worker_program")]
    pub program: PathBuf,
    /// Sensor data file passed to every worker
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: default_worker_program(),
            data_file: default_data_file(),
        }
    }
}

fn default_worker_program() -> PathBuf {
    PathBuf::from(DEFAULT_WORKER_PROGRAM)
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

/// How records are collected
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default)]
    pub channel: ChannelMode,
    /// Upper bound on collection and reaping, in milliseconds (none = wait forever)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl CollectionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Wiring between workers and the coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelMode {
    /// All workers write into one pipe
    #[default]
    Shared,
    /// Each worker writes into its own pipe; results are merged in launch order
    PerWorker,
}

/// Report output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Build the effective configuration from the command line
///
/// Loads `--config` if given, applies CLI overrides, and validates the result.
pub fn build_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => toml::parse_toml_file(path)?,
        None => Config::default(),
    };

    let config = toml::merge_cli_with_config(cli, base)?;
    validator::validate_config(&config).context("Configuration validation failed")?;

    Ok(config)
}
