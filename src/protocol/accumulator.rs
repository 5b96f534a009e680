//! Partial-read assembly of fixed-width records
//!
//! A single `read` on the channel may return any number of bytes up to what was
//! asked for. The accumulator owns one record-sized buffer, hands out the
//! still-empty tail for the next read, and yields a decoded record only once the
//! buffer is full.

use super::{decode, RegionRecord, RECORD_SIZE};

/// Bounded buffer for the record currently being received
#[derive(Debug)]
pub struct RecordAccumulator {
    buf: [u8; RECORD_SIZE],
    filled: usize,
}

impl RecordAccumulator {
    pub fn new() -> Self {
        Self {
            buf: [0u8; RECORD_SIZE],
            filled: 0,
        }
    }

    /// Unfilled tail of the buffer, to be passed to `Read::read`
    ///
    /// Never empty: a full buffer is decoded and reset by [`advance`](Self::advance).
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Record that `n` bytes were written into [`unfilled_mut`](Self::unfilled_mut)
    ///
    /// Returns the decoded record when this completes it, after which the
    /// accumulator starts a fresh record.
    pub fn advance(&mut self, n: usize) -> Option<RegionRecord> {
        debug_assert!(self.filled + n <= RECORD_SIZE, "advance past record boundary");
        self.filled = (self.filled + n).min(RECORD_SIZE);

        if self.filled < RECORD_SIZE {
            return None;
        }

        self.filled = 0;
        decode(&self.buf)
    }

    /// Bytes received so far for the in-flight record
    pub fn filled(&self) -> usize {
        self.filled
    }
}

impl Default for RecordAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
