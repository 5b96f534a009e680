//! Record collection and worker reaping
//!
//! The collector reads the channel until exactly the expected number of
//! records has been assembled. Reads may return any fragment of a record;
//! fragments are accumulated in a [`RecordAccumulator`] and a record is only
//! decoded once all [`RECORD_SIZE`](crate::protocol::RECORD_SIZE) bytes are in.
//!
//! End-of-stream before the last record is complete is fatal, as is any read
//! error. Records are returned in arrival order.

use crate::error::{self, ReportError};
use crate::protocol::{RecordAccumulator, RegionRecord};
use crate::worker::WorkerHandle;
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::process::ExitStatus;
use std::time::Instant;
use tracing::{debug, warn};

/// Read exactly `expected` records from `reader`
pub fn collect_records<R: Read>(reader: &mut R, expected: usize) -> Result<Vec<RegionRecord>, ReportError> {
    let mut records = error::reserve_exact(expected, "allocating record storage")?;
    collect_into(reader, &mut records, expected)?;
    Ok(records)
}

/// Read exactly `expected` records from `reader`, appending them to `records`
///
/// Counts in the returned errors refer to this call only. Callers that reserve
/// `records` up front never reallocate here.
pub fn collect_into<R: Read>(
    reader: &mut R,
    records: &mut Vec<RegionRecord>,
    expected: usize,
) -> Result<(), ReportError> {
    let start = records.len();
    let mut acc = RecordAccumulator::new();

    while records.len() - start < expected {
        let received = records.len() - start;
        let n = match reader.read(acc.unfilled_mut()) {
            Ok(0) => {
                return Err(ReportError::UnexpectedEndOfStream {
                    received,
                    expected,
                    partial_bytes: acc.filled(),
                });
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                return Err(ReportError::Timeout { received, expected });
            }
            Err(e) => return Err(ReportError::ChannelRead(e)),
        };

        if let Some(record) = acc.advance(n) {
            debug!(
                region_id = record.region_id,
                received = received + 1,
                expected,
                "record received"
            );
            records.push(record);
        }
    }

    Ok(())
}

/// Drain one record from each worker's private pipe, in launch order
///
/// Records are appended to `records`, which should have room for one record
/// per handle. A record whose `region_id` differs from the worker's assigned
/// region is kept (records are self-describing) but logged.
pub fn collect_per_worker(
    handles: &mut [WorkerHandle],
    deadline: Option<Instant>,
    records: &mut Vec<RegionRecord>,
) -> Result<(), ReportError> {
    let expected = handles.len();

    for (received, handle) in handles.iter_mut().enumerate() {
        let stdout = handle.take_stdout().ok_or_else(|| {
            ReportError::ChannelRead(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("worker for region {} has no output pipe", handle.region_id()),
            ))
        })?;

        let mut reader = TimedReader::new(stdout, deadline);
        match collect_into(&mut reader, records, 1) {
            Ok(()) => {}
            Err(ReportError::UnexpectedEndOfStream { partial_bytes, .. }) => {
                return Err(ReportError::UnexpectedEndOfStream {
                    received,
                    expected,
                    partial_bytes,
                });
            }
            Err(ReportError::Timeout { .. }) => {
                return Err(ReportError::Timeout { received, expected });
            }
            Err(e) => return Err(e),
        }

        if let Some(record) = records.last() {
            if i64::from(record.region_id) != i64::from(handle.region_id()) {
                warn!(
                    assigned = handle.region_id(),
                    reported = record.region_id,
                    "worker reported a different region id"
                );
            }
        }
    }

    Ok(())
}

/// Wait for every worker, in launch order
///
/// Exit statuses are not inspected beyond logging. With a deadline, workers
/// still running once it passes are killed.
pub fn reap_workers(handles: Vec<WorkerHandle>, deadline: Option<Instant>) -> Vec<Option<ExitStatus>> {
    let statuses: Vec<_> = handles.into_iter().map(|handle| handle.reap(deadline)).collect();
    debug!(workers = statuses.len(), "all workers reaped");
    statuses
}

/// Reader that gives up once a deadline has passed
///
/// Before each read the descriptor is polled for readability with the time
/// remaining; once the deadline passes the read fails with
/// [`io::ErrorKind::TimedOut`]. Without a deadline reads block as usual.
#[derive(Debug)]
pub struct TimedReader<R> {
    inner: R,
    deadline: Option<Instant>,
}

impl<R> TimedReader<R> {
    pub fn new(inner: R, deadline: Option<Instant>) -> Self {
        Self { inner, deadline }
    }
}

impl<R: Read + AsRawFd> Read for TimedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(deadline) = self.deadline {
            wait_readable(self.inner.as_raw_fd(), deadline)?;
        }
        self.inner.read(buf)
    }
}

/// Block until `fd` is readable (data, hang-up or error) or `deadline` passes
fn wait_readable(fd: RawFd, deadline: Instant) -> io::Result<()> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "deadline elapsed"));
        }

        let timeout_ms = remaining.as_millis().clamp(1, i32::MAX as u128) as i32;
        let mut pollfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };

        let ret = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if ret > 0 {
            // The following read reports whether this was data, EOF or an error.
            return Ok(());
        }
    }
}
