//! Worker record protocol
//!
//! This module defines the fixed-width binary record a worker writes to its
//! standard output and the coordinator reads back from the channel.
//!
//! # Wire Format
//!
//! Each record is exactly [`RECORD_SIZE`] bytes, fields in declaration order,
//! each in native byte order:
//!
//! ```text
//! +-----------+---------+-------------+---------+---------+
//! | region_id | median  | average     | max     | min     |
//! | i32       | i32     | f32         | i32     | i32     |
//! +-----------+---------+-------------+---------+---------+
//!   0..4        4..8      8..12         12..16    16..20
//! ```
//!
//! There is no framing and no endianness negotiation: worker and coordinator
//! must run on the same machine (or at least the same byte order). A byte
//! sequence shorter than [`RECORD_SIZE`] is always an in-flight record, never a
//! valid terminal state.

pub mod accumulator;

pub use accumulator::RecordAccumulator;

use serde::{Deserialize, Serialize};

/// Size in bytes of one encoded [`RegionRecord`]
pub const RECORD_SIZE: usize = 20;

/// Statistics computed by one worker for one region
///
/// `min <= max` is expected but not validated; a buggy worker can send
/// anything and it is passed through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// 1-based region identifier
    pub region_id: i32,
    pub median: i32,
    pub average: f32,
    pub max: i32,
    pub min: i32,
}

/// Encode a record into its fixed-width wire representation
pub fn encode(record: &RegionRecord) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[0..4].copy_from_slice(&record.region_id.to_ne_bytes());
    buf[4..8].copy_from_slice(&record.median.to_ne_bytes());
    buf[8..12].copy_from_slice(&record.average.to_ne_bytes());
    buf[12..16].copy_from_slice(&record.max.to_ne_bytes());
    buf[16..20].copy_from_slice(&record.min.to_ne_bytes());
    buf
}

/// Decode a record from the first [`RECORD_SIZE`] bytes of `bytes`
///
/// Returns `None` if fewer than [`RECORD_SIZE`] bytes are supplied. Bytes past
/// the first record are ignored.
pub fn decode(bytes: &[u8]) -> Option<RegionRecord> {
    let bytes = bytes.get(..RECORD_SIZE)?;
    let field = |offset: usize| -> [u8; 4] {
        [bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]]
    };

    Some(RegionRecord {
        region_id: i32::from_ne_bytes(field(0)),
        median: i32::from_ne_bytes(field(4)),
        average: f32::from_ne_bytes(field(8)),
        max: i32::from_ne_bytes(field(12)),
        min: i32::from_ne_bytes(field(16)),
    })
}
