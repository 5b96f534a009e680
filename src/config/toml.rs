//! TOML configuration file parsing
//!
//! ```toml
//! [worker]
//! program = "./stats"
//! data_file = "sensor_data.bin"
//!
//! [collection]
//! channel = "per-worker"   # or "shared"
//! timeout_ms = 30000
//!
//! [output]
//! format = "json"          # or "text"
//! ```

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert::{convert_channel_mode, convert_report_format, parse_duration_ms};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    config.regions = cli.regions;

    if let Some(program) = &cli.worker {
        config.worker.program = program.clone();
    }
    if let Some(data_file) = &cli.data_file {
        config.worker.data_file = data_file.clone();
    }

    if let Some(channel) = cli.channel {
        config.collection.channel = convert_channel_mode(channel);
    }
    if let Some(timeout) = &cli.timeout {
        let ms = parse_duration_ms(timeout).context("Invalid timeout")?;
        config.collection.timeout_ms = Some(ms);
    }

    if let Some(format) = cli.format {
        config.output.format = convert_report_format(format);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_toml_string("").unwrap();

        assert_eq!(config.worker.program, PathBuf::from(DEFAULT_WORKER_PROGRAM));
        assert_eq!(config.worker.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(config.collection.channel, ChannelMode::Shared);
        assert_eq!(config.collection.timeout(), None);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_full_file() {
        let config = parse_toml_string(
            r#"
            [worker]
            program = "/usr/local/bin/stats"
            data_file = "/data/sensors.bin"

            [collection]
            channel = "per-worker"
            timeout_ms = 1500

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.worker.program, PathBuf::from("/usr/local/bin/stats"));
        assert_eq!(config.worker.data_file, PathBuf::from("/data/sensors.bin"));
        assert_eq!(config.collection.channel, ChannelMode::PerWorker);
        assert_eq!(config.collection.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        assert!(parse_toml_string("[collection]\nchannel = \"carrier-pigeon\"\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse_toml_string(
            r#"
            [worker]
            program = "/usr/local/bin/stats"
            data_file = "/data/sensors.bin"

            [collection]
            timeout_ms = 1500
            "#,
        )
        .unwrap();
        let cli = Cli::try_parse_from([
            "region-report",
            "--data-file",
            "south.bin",
            "--timeout",
            "250ms",
            "--channel",
            "per-worker",
            "6",
        ])
        .unwrap();

        let config = merge_cli_with_config(&cli, file).unwrap();
        assert_eq!(config.regions, 6);
        assert_eq!(config.worker.program, PathBuf::from("/usr/local/bin/stats"));
        assert_eq!(config.worker.data_file, PathBuf::from("south.bin"));
        assert_eq!(config.collection.channel, ChannelMode::PerWorker);
        assert_eq!(config.collection.timeout_ms, Some(250));
    }

    #[test]
    fn test_invalid_cli_timeout() {
        let cli = Cli::try_parse_from(["region-report", "--timeout", "later", "2"]).unwrap();
        assert!(merge_cli_with_config(&cli, Config::default()).is_err());
    }
}
