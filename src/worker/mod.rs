//! Worker process launching
//!
//! Each region is computed by a separate instance of an external worker
//! program. A worker is invoked as
//!
//! ```text
//! <program> <data source> <region id> stdout
//! ```
//!
//! and is expected to write exactly one [`RegionRecord`](crate::protocol::RegionRecord)
//! to its standard output before exiting.
//!
//! Two wirings are supported:
//!
//! - [`launch_shared`]: every worker's stdout is a duplicate of one shared
//!   pipe's write end. This relies on each worker emitting its whole record with
//!   a single `write` call; pipe writes of at most `PIPE_BUF` bytes are atomic, so
//!   records arrive fragmented in time but never interleaved with each other.
//! - [`launch_piped`]: every worker gets a private stdout pipe, which the
//!   coordinator drains independently. No atomicity assumption is needed.

pub mod channel;

pub use channel::SharedChannel;

use crate::error::{self, ReportError};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Literal third argument telling the worker to write its record to stdout
pub const OUTPUT_MARKER: &str = "stdout";

/// How often a worker is polled while waiting for it with a deadline
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Program and shared data source used to start every worker
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub data_source: PathBuf,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>, data_source: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            data_source: data_source.into(),
        }
    }

    /// Spawn the worker for `region_id` with the given stdout
    fn spawn(&self, region_id: u32, stdout: Stdio) -> Result<WorkerHandle, ReportError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.data_source)
            .arg(region_id.to_string())
            .arg(OUTPUT_MARKER)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit());

        let child = cmd.spawn().map_err(|source| match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                ReportError::WorkerExecFailure {
                    program: self.program.clone(),
                    source,
                }
            }
            _ => ReportError::SpawnFailure { region_id, source },
        })?;

        debug!(region_id, pid = child.id(), "worker launched");
        Ok(WorkerHandle { region_id, child })
    }
}

/// A launched worker process
///
/// Consumed when reaped, so each worker is waited for exactly once.
#[derive(Debug)]
pub struct WorkerHandle {
    region_id: u32,
    child: Child,
}

impl WorkerHandle {
    /// Region this worker was asked to compute
    pub fn region_id(&self) -> u32 {
        self.region_id
    }

    /// OS process identifier
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Take the private stdout pipe (only present for [`launch_piped`] workers)
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Wait for the worker to exit
    ///
    /// Without a deadline this blocks until the worker exits. With a deadline,
    /// a worker still running when it passes is killed and then reaped. The exit
    /// status is returned for diagnostics only; `None` means it could not be
    /// obtained.
    pub fn reap(mut self, deadline: Option<Instant>) -> Option<ExitStatus> {
        let Some(deadline) = deadline else {
            return self.wait_logged();
        };

        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    self.log_exit(status);
                    return Some(status);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(region_id = self.region_id, error = %e, "failed to poll worker");
                    return None;
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(
                    region_id = self.region_id,
                    pid = self.pid(),
                    "worker still running at deadline, killing"
                );
                return self.terminate();
            }
            thread::sleep(REAP_POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Kill the worker and reap it
    pub fn terminate(mut self) -> Option<ExitStatus> {
        if let Err(e) = self.child.kill() {
            // Already exited; wait() below still collects it.
            debug!(region_id = self.region_id, error = %e, "kill failed");
        }
        self.wait_logged()
    }

    fn wait_logged(&mut self) -> Option<ExitStatus> {
        match self.child.wait() {
            Ok(status) => {
                self.log_exit(status);
                Some(status)
            }
            Err(e) => {
                warn!(region_id = self.region_id, error = %e, "failed to wait for worker");
                None
            }
        }
    }

    fn log_exit(&self, status: ExitStatus) {
        if status.success() {
            debug!(region_id = self.region_id, pid = self.pid(), "worker exited");
        } else {
            warn!(
                region_id = self.region_id,
                pid = self.pid(),
                %status,
                "worker exited unsuccessfully"
            );
        }
    }
}

/// Launch `regions` workers writing into the shared channel
///
/// Region ids run from 1 to `regions`, one per worker. `writer` is the
/// channel's write end; it is dropped before returning so that the read side
/// sees end-of-stream once the last worker exits.
///
/// Launching is all-or-nothing: if any spawn fails, the workers already started
/// are killed and reaped and the error is returned. Handle storage for every
/// worker is reserved before the first spawn.
pub fn launch_shared(
    command: &WorkerCommand,
    regions: u32,
    writer: File,
) -> Result<Vec<WorkerHandle>, ReportError> {
    let mut handles = error::reserve_exact(regions as usize, "allocating worker handles")?;

    for region_id in 1..=regions {
        let spawned = writer
            .try_clone()
            .map_err(|source| ReportError::ResourceExhausted {
                what: "duplicating worker channel",
                source,
            })
            .and_then(|stdout| command.spawn(region_id, Stdio::from(stdout)));

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                abort_workers(handles);
                return Err(e);
            }
        }
    }

    drop(writer);
    debug!(workers = handles.len(), "all workers launched on shared channel");
    Ok(handles)
}

/// Launch `regions` workers, each with a private stdout pipe
///
/// Same failure semantics as [`launch_shared`].
pub fn launch_piped(command: &WorkerCommand, regions: u32) -> Result<Vec<WorkerHandle>, ReportError> {
    let mut handles = error::reserve_exact(regions as usize, "allocating worker handles")?;

    for region_id in 1..=regions {
        match command.spawn(region_id, Stdio::piped()) {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                abort_workers(handles);
                return Err(e);
            }
        }
    }

    debug!(workers = handles.len(), "all workers launched on private channels");
    Ok(handles)
}

/// Kill and reap every worker
///
/// Used on error paths so no child outlives a failed run.
pub fn abort_workers(handles: Vec<WorkerHandle>) {
    for handle in handles {
        handle.terminate();
    }
}
