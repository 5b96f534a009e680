//! Coordinator
//!
//! Fans the report out to one worker per region and fans the results back in:
//!
//! 1. launch all workers, wired to the configured channel
//! 2. collect exactly one record per worker
//! 3. reap every worker
//! 4. aggregate the records
//!
//! Any failure aborts the run; workers still alive at that point are killed
//! and reaped before the error is returned. No partial result is produced.

pub mod collector;

pub use collector::{collect_into, collect_per_worker, collect_records, reap_workers, TimedReader};

use crate::config::{ChannelMode, Config};
use crate::error::{self, ReportError};
use crate::protocol::RegionRecord;
use crate::stats::{aggregate, RegionAggregates};
use crate::worker::{self, SharedChannel, WorkerCommand};
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Number of regions the run was asked to cover
    pub regions: u32,
    /// One record per region, in arrival order
    pub records: Vec<RegionRecord>,
    pub aggregates: RegionAggregates,
}

/// Launches, collects, reaps and aggregates
#[derive(Debug, Clone)]
pub struct Coordinator {
    command: WorkerCommand,
    regions: u32,
    channel: ChannelMode,
    timeout: Option<Duration>,
}

impl Coordinator {
    pub fn new(command: WorkerCommand, regions: u32) -> Self {
        Self {
            command,
            regions,
            channel: ChannelMode::default(),
            timeout: None,
        }
    }

    /// Build a coordinator from a validated configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            WorkerCommand::new(&config.worker.program, &config.worker.data_file),
            config.regions,
        )
        .with_channel(config.collection.channel)
        .with_timeout(config.collection.timeout())
    }

    pub fn with_channel(mut self, channel: ChannelMode) -> Self {
        self.channel = channel;
        self
    }

    /// Bound the whole run (collection and reaping) by `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn run(&self) -> Result<RunOutcome, ReportError> {
        if self.regions == 0 {
            return Err(ReportError::InvalidArgument(
                "number of regions must be at least 1".to_string(),
            ));
        }

        let deadline = self.timeout.map(|t| Instant::now() + t);
        debug!(
            regions = self.regions,
            channel = ?self.channel,
            program = %self.command.program.display(),
            "starting workers"
        );

        // Storage for every record is reserved before any worker is launched.
        let mut records =
            error::reserve_exact(self.regions as usize, "allocating record storage")?;
        match self.channel {
            ChannelMode::Shared => self.run_shared(deadline, &mut records)?,
            ChannelMode::PerWorker => self.run_per_worker(deadline, &mut records)?,
        }

        let aggregates = aggregate(&records)?;
        Ok(RunOutcome {
            regions: self.regions,
            records,
            aggregates,
        })
    }

    fn run_shared(
        &self,
        deadline: Option<Instant>,
        records: &mut Vec<RegionRecord>,
    ) -> Result<(), ReportError> {
        let SharedChannel { reader, writer } = SharedChannel::open()?;
        let handles = worker::launch_shared(&self.command, self.regions, writer)?;

        let mut reader = TimedReader::new(reader, deadline);
        let collected = collect_into(&mut reader, records, self.regions as usize);
        // Closing the read end first lets any worker still writing fail fast.
        drop(reader);

        match collected {
            Ok(()) => {
                reap_workers(handles, deadline);
                Ok(())
            }
            Err(e) => {
                worker::abort_workers(handles);
                Err(e)
            }
        }
    }

    fn run_per_worker(
        &self,
        deadline: Option<Instant>,
        records: &mut Vec<RegionRecord>,
    ) -> Result<(), ReportError> {
        let mut handles = worker::launch_piped(&self.command, self.regions)?;

        match collect_per_worker(&mut handles, deadline, records) {
            Ok(()) => {
                reap_workers(handles, deadline);
                Ok(())
            }
            Err(e) => {
                worker::abort_workers(handles);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode, RECORD_SIZE};
    use crate::stats::Extreme;
    use crate::test_util::{case_script, printf_bytes, printf_record, sh_worker};
    use tempfile::TempDir;

    fn example_records() -> Vec<RegionRecord> {
        vec![
            RegionRecord { region_id: 1, median: 20, average: 21.5, max: 30, min: 10 },
            RegionRecord { region_id: 2, median: 25, average: 19.3, max: 35, min: 5 },
        ]
    }

    fn sorted_ids(records: &[RegionRecord]) -> Vec<i32> {
        let mut ids: Vec<i32> = records.iter().map(|r| r.region_id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_two_region_example_shared_channel() {
        let dir = TempDir::new().unwrap();
        let command = sh_worker(&dir, &case_script(&example_records()));

        let outcome = Coordinator::new(command, 2).run().unwrap();

        assert_eq!(outcome.regions, 2);
        assert_eq!(sorted_ids(&outcome.records), vec![1, 2]);
        assert_eq!(outcome.aggregates.highest_value, Extreme { region_id: 2, value: 35 });
        assert_eq!(outcome.aggregates.lowest_value, Extreme { region_id: 2, value: 5 });
        assert_eq!(outcome.aggregates.highest_average, Extreme { region_id: 1, value: 21.5 });
        assert_eq!(outcome.aggregates.lowest_average, Extreme { region_id: 2, value: 19.3 });
    }

    #[test]
    fn test_two_region_example_per_worker_channel() {
        let dir = TempDir::new().unwrap();
        let command = sh_worker(&dir, &case_script(&example_records()));

        let outcome = Coordinator::new(command, 2)
            .with_channel(ChannelMode::PerWorker)
            .run()
            .unwrap();

        // Per-worker channels merge in launch order.
        assert_eq!(outcome.records, example_records());
        assert_eq!(outcome.aggregates.highest_average.region_id, 1);
    }

    #[test]
    fn test_every_region_reported_once() {
        let dir = TempDir::new().unwrap();
        let records: Vec<RegionRecord> = (1..=16)
            .map(|i| RegionRecord {
                region_id: i,
                median: i,
                average: i as f32 / 4.0,
                max: 100 - i,
                min: -i,
            })
            .collect();
        let command = sh_worker(&dir, &case_script(&records));

        for channel in [ChannelMode::Shared, ChannelMode::PerWorker] {
            let outcome = Coordinator::new(command.clone(), 16)
                .with_channel(channel)
                .run()
                .unwrap();

            assert_eq!(outcome.records.len(), 16);
            assert_eq!(sorted_ids(&outcome.records), (1..=16).collect::<Vec<_>>());
            assert_eq!(outcome.aggregates.highest_value, Extreme { region_id: 1, value: 99 });
            assert_eq!(outcome.aggregates.lowest_value, Extreme { region_id: 16, value: -16 });
        }
    }

    #[test]
    fn test_worker_without_output_is_unexpected_eof() {
        let dir = TempDir::new().unwrap();
        // Region 2 exits without writing.
        let script = format!(
            "if [ \"$1\" = 1 ]; then {}; fi\n",
            printf_record(&example_records()[0])
        );
        let command = sh_worker(&dir, &script);

        for channel in [ChannelMode::Shared, ChannelMode::PerWorker] {
            let err = Coordinator::new(command.clone(), 2)
                .with_channel(channel)
                .run()
                .unwrap_err();
            assert!(
                matches!(err, ReportError::UnexpectedEndOfStream { received: 1, expected: 2, .. }),
                "unexpected error: {:?}",
                err
            );
        }
    }

    #[test]
    fn test_truncated_record_is_unexpected_eof() {
        let dir = TempDir::new().unwrap();
        let bytes = encode(&example_records()[0]);
        let command = sh_worker(&dir, &format!("{}\n", printf_bytes(&bytes[..RECORD_SIZE / 2])));

        let err = Coordinator::new(command, 1).run().unwrap_err();
        assert!(matches!(
            err,
            ReportError::UnexpectedEndOfStream { received: 0, expected: 1, partial_bytes: 10 }
        ));
    }

    #[test]
    fn test_missing_worker_program() {
        let command = WorkerCommand::new("/nonexistent/stats", "sensor_data.bin");

        let err = Coordinator::new(command, 3).run().unwrap_err();
        assert!(matches!(err, ReportError::WorkerExecFailure { .. }));
    }

    #[test]
    fn test_largest_region_count_fails_without_aborting() {
        let command = WorkerCommand::new("/nonexistent/stats", "sensor_data.bin");

        for channel in [ChannelMode::Shared, ChannelMode::PerWorker] {
            let err = Coordinator::new(command.clone(), i32::MAX as u32)
                .with_channel(channel)
                .run()
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    ReportError::ResourceExhausted { .. } | ReportError::WorkerExecFailure { .. }
                ),
                "unexpected error: {:?}",
                err
            );
        }
    }

    #[test]
    fn test_zero_regions_rejected_before_launch() {
        // The program does not exist; rejection must happen before any spawn.
        let command = WorkerCommand::new("/nonexistent/stats", "sensor_data.bin");

        let err = Coordinator::new(command, 0).run().unwrap_err();
        assert!(matches!(err, ReportError::InvalidArgument(_)));
    }

    #[test]
    fn test_hung_worker_times_out() {
        let dir = TempDir::new().unwrap();
        let script = format!(
            "if [ \"$1\" = 1 ]; then {}; else exec sleep 30; fi\n",
            printf_record(&example_records()[0])
        );
        let command = sh_worker(&dir, &script);
        let started = Instant::now();

        for channel in [ChannelMode::Shared, ChannelMode::PerWorker] {
            let err = Coordinator::new(command.clone(), 2)
                .with_channel(channel)
                .with_timeout(Some(Duration::from_millis(300)))
                .run()
                .unwrap_err();
            assert!(
                matches!(err, ReportError::Timeout { received: 1, expected: 2 }),
                "unexpected error: {:?}",
                err
            );
        }

        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test]
    fn test_failing_worker_status_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let script = format!("{}\nexit 7\n", printf_record(&example_records()[0]));
        let command = sh_worker(&dir, &script);

        let outcome = Coordinator::new(command, 1).run().unwrap();
        assert_eq!(outcome.records, vec![example_records()[0]]);
    }
}
