//! Statistical comparison of time-series windows.
//!
//! A detector slices a metric into a "current" and a "previous"
//! [`interval::WindowedInterval`], compares them with an
//! [`comparator::IntervalComparator`], and streams per-timestamp results through
//! a [`response::RollingResponse`].

pub mod comparator;
pub mod config;
pub mod error;
pub mod interval;
pub mod per_series;
pub mod response;
pub mod series;
pub mod stats;
pub mod time;

pub use comparator::{Direction, IntervalComparator};
pub use config::{ComparatorConfig, CorrectionMethod, IntervalConfig};
pub use error::{StatsError, StatsResult};
pub use interval::{ColumnSpikes, IntervalBounds, SingleSpike, SpikeSet, WindowedInterval};
pub use per_series::PerSeries;
pub use response::{ConfidenceBand, ResponsePoint, RollingResponse};
pub use series::{TimeSeries, TimeSeriesRow};

#[cfg(test)]
pub mod test_support;
