//! Cross-region aggregation
//!
//! Finds, in a single pass over the collected records:
//!
//! - the region with the highest `max` reading
//! - the region with the lowest `min` reading
//! - the region with the highest `average`
//! - the region with the lowest `average`
//!
//! All comparisons are strict, so on a tie the record that was scanned first
//! (earliest arrival) keeps the title.
//!
//! # Example
//!
//! ```
//! use region_report::protocol::RegionRecord;
//! use region_report::stats::aggregate;
//!
//! let records = [
//!     RegionRecord { region_id: 1, median: 20, average: 21.5, max: 30, min: 10 },
//!     RegionRecord { region_id: 2, median: 25, average: 19.3, max: 35, min: 5 },
//! ];
//!
//! let aggregates = aggregate(&records).unwrap();
//! assert_eq!(aggregates.highest_value.region_id, 2);
//! assert_eq!(aggregates.highest_value.value, 35);
//! assert_eq!(aggregates.highest_average.region_id, 1);
//! ```

use crate::error::ReportError;
use crate::protocol::RegionRecord;
use serde::Serialize;
use tracing::debug;

/// An extreme value and the region that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extreme<T> {
    pub region_id: i32,
    pub value: T,
}

/// Extrema across all regions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionAggregates {
    /// Largest `max` reading
    pub highest_value: Extreme<i32>,
    /// Smallest `min` reading
    pub lowest_value: Extreme<i32>,
    /// Largest `average`
    pub highest_average: Extreme<f32>,
    /// Smallest `average`
    pub lowest_average: Extreme<f32>,
}

impl RegionAggregates {
    /// Seed all four extrema from one record
    fn seed(record: &RegionRecord) -> Self {
        Self {
            highest_value: Extreme { region_id: record.region_id, value: record.max },
            lowest_value: Extreme { region_id: record.region_id, value: record.min },
            highest_average: Extreme { region_id: record.region_id, value: record.average },
            lowest_average: Extreme { region_id: record.region_id, value: record.average },
        }
    }

    fn observe(&mut self, record: &RegionRecord) {
        if record.max > self.highest_value.value {
            self.highest_value = Extreme { region_id: record.region_id, value: record.max };
        }
        if record.min < self.lowest_value.value {
            self.lowest_value = Extreme { region_id: record.region_id, value: record.min };
        }
        if record.average > self.highest_average.value {
            self.highest_average = Extreme { region_id: record.region_id, value: record.average };
        }
        if record.average < self.lowest_average.value {
            self.lowest_average = Extreme { region_id: record.region_id, value: record.average };
        }
    }
}

/// Running aggregation over records in arrival order
///
/// Keeps only the current extrema, not the records.
#[derive(Debug, Default)]
pub struct RegionAggregator {
    current: Option<RegionAggregates>,
    regions: usize,
}

impl RegionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the running extrema
    pub fn add_region(&mut self, record: &RegionRecord) {
        match self.current.as_mut() {
            Some(aggregates) => aggregates.observe(record),
            None => self.current = Some(RegionAggregates::seed(record)),
        }
        self.regions += 1;
    }

    /// Number of records folded in so far
    pub fn num_regions(&self) -> usize {
        self.regions
    }

    /// Final extrema
    ///
    /// Fails with [`ReportError::EmptyRecordSet`] if no record was added.
    pub fn finish(self) -> Result<RegionAggregates, ReportError> {
        self.current.ok_or(ReportError::EmptyRecordSet)
    }
}

/// Compute the extrema of `records` in one pass
pub fn aggregate(records: &[RegionRecord]) -> Result<RegionAggregates, ReportError> {
    let mut aggregator = RegionAggregator::new();
    for record in records {
        aggregator.add_region(record);
    }
    debug!(regions = aggregator.num_regions(), "aggregated region records");
    aggregator.finish()
}
