//! Region statistics
//!
//! Cross-region extrema computed from the records returned by the workers.
//! Per-region statistics themselves are computed by the workers and arrive
//! ready-made in each [`RegionRecord`](crate::protocol::RegionRecord).

pub mod aggregator;

pub use aggregator::{aggregate, Extreme, RegionAggregator, RegionAggregates};
