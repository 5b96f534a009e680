//! Region Report - fan-out/fan-in sensor statistics coordinator
//!
//! Region report computes a summary over per-region sensor statistics by
//! delegating each region to an independent worker process and collecting one
//! fixed-width binary record per worker over a pipe.
//!
//! # Architecture
//!
//! - **Protocol**: fixed-width native-endian record codec and partial-read accumulator
//! - **Worker**: launches one worker process per region on a shared or per-worker pipe
//! - **Coordinator**: collects exactly one record per worker, reaps, aggregates
//! - **Stats**: cross-region extrema with first-seen tie-breaking
//! - **Output**: text and JSON reports

pub mod config;
pub mod coordinator;
pub mod error;
pub mod output;
pub mod protocol;
pub mod stats;
pub mod worker;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
pub(crate) mod shell_fixtures;
#[cfg(test)]
pub(crate) mod test_util;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{Coordinator, RunOutcome};
pub use error::ReportError;
pub use protocol::RegionRecord;
