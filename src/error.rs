//! Error taxonomy for the report coordinator
//!
//! Every error is terminal: the coordinator never retries and never reports
//! partial results. The binary maps each kind to an exit code via
//! [`ReportError::exit_code`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while launching workers, collecting records, or aggregating
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("resource exhausted: {what}: {source}")]
    ResourceExhausted {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn worker for region {region_id}: {source}")]
    SpawnFailure {
        region_id: u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to execute worker program {}: {source}", .program.display())]
    WorkerExecFailure {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read from worker channel: {0}")]
    ChannelRead(#[source] io::Error),

    #[error(
        "unexpected end of stream after {received} of {expected} records \
         ({partial_bytes} bytes of an incomplete record pending)"
    )]
    UnexpectedEndOfStream {
        received: usize,
        expected: usize,
        partial_bytes: usize,
    },

    #[error("timed out waiting for worker records ({received} of {expected} received)")]
    Timeout { received: usize, expected: usize },

    #[error("cannot aggregate an empty record set")]
    EmptyRecordSet,

    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

impl ReportError {
    /// Process exit code for this error
    ///
    /// All kinds currently abort with status 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::InvalidArgument(_)
            | ReportError::ResourceExhausted { .. }
            | ReportError::SpawnFailure { .. }
            | ReportError::WorkerExecFailure { .. }
            | ReportError::ChannelRead(_)
            | ReportError::UnexpectedEndOfStream { .. }
            | ReportError::Timeout { .. }
            | ReportError::EmptyRecordSet
            | ReportError::Output(_) => 1,
        }
    }
}

/// Allocate an empty vector with room for exactly `len` items
///
/// Allocation failure is reported as [`ReportError::ResourceExhausted`]
/// instead of aborting the process.
pub fn reserve_exact<T>(len: usize, what: &'static str) -> Result<Vec<T>, ReportError> {
    let mut items = Vec::new();
    items
        .try_reserve_exact(len)
        .map_err(|e| ReportError::ResourceExhausted {
            what,
            source: io::Error::new(io::ErrorKind::OutOfMemory, e),
        })?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_exits_with_one() {
        let errors = vec![
            ReportError::InvalidArgument("regions must be at least 1".to_string()),
            ReportError::EmptyRecordSet,
            ReportError::Timeout { received: 1, expected: 2 },
            ReportError::UnexpectedEndOfStream { received: 0, expected: 2, partial_bytes: 7 },
            ReportError::ChannelRead(io::Error::from(io::ErrorKind::BrokenPipe)),
        ];

        for err in errors {
            assert_eq!(err.exit_code(), 1, "unexpected exit code for {}", err);
        }
    }

    #[test]
    fn test_end_of_stream_message_mentions_counts() {
        let err = ReportError::UnexpectedEndOfStream { received: 1, expected: 3, partial_bytes: 12 };
        let msg = err.to_string();
        assert!(msg.contains("1 of 3"));
        assert!(msg.contains("12 bytes"));
    }

    #[test]
    fn test_reserve_exact() {
        let items: Vec<u64> = reserve_exact(16, "allocating test storage").unwrap();
        assert!(items.is_empty());
        assert!(items.capacity() >= 16);

        let err = reserve_exact::<u64>(usize::MAX, "allocating test storage").unwrap_err();
        match err {
            ReportError::ResourceExhausted { what, source } => {
                assert_eq!(what, "allocating test storage");
                assert_eq!(source.kind(), io::ErrorKind::OutOfMemory);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
