//! Time-bounded slices of a metric and their summary statistics.

use crate::config::{validate_spike_threshold, IntervalConfig};
use crate::error::{StatsError, StatsResult};
use crate::per_series::PerSeries;
use crate::series::{TimeSeries, UNIVARIATE_COLUMN};
use crate::stats::moments::{mean, sample_variance};
use crate::time::{day_label, in_half_open};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::OnceCell;

/// Half-open `[start, end)` time bound; also identifies an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IntervalBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A point whose z-score within its interval reached the spike threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SingleSpike {
    pub time: DateTime<Utc>,
    pub value: f64,
    pub n_sigma: f64,
}

impl SingleSpike {
    pub fn time_str(&self) -> String {
        day_label(self.time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpikes {
    pub column: String,
    pub spikes: Vec<SingleSpike>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SpikeSet {
    Univariate(Vec<SingleSpike>),
    /// Only columns with at least one spike appear, in column order.
    Multivariate(Vec<ColumnSpikes>),
}

impl SpikeSet {
    pub fn total(&self) -> usize {
        match self {
            SpikeSet::Univariate(spikes) => spikes.len(),
            SpikeSet::Multivariate(columns) => columns.iter().map(|c| c.spikes.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Debug, Clone)]
pub struct WindowedInterval {
    bounds: IntervalBounds,
    columns: Vec<String>,
    data: Option<TimeSeries>,
    previous_interval: Option<IntervalBounds>,
    spike_std_threshold: f64,
    spikes: OnceCell<SpikeSet>,
}

impl WindowedInterval {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> StatsResult<Self> {
        Self::with_config(start_time, end_time, &IntervalConfig::default())
    }

    pub fn with_config(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        config: &IntervalConfig,
    ) -> StatsResult<Self> {
        if end_time < start_time {
            return Err(StatsError::InvalidBounds {
                start: start_time,
                end: end_time,
            });
        }
        config.validate()?;
        Ok(Self {
            bounds: IntervalBounds {
                start: start_time,
                end: end_time,
            },
            columns: vec![UNIVARIATE_COLUMN.to_string()],
            data: None,
            previous_interval: None,
            spike_std_threshold: config.spike_std_threshold,
            spikes: OnceCell::new(),
        })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.bounds.start
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.bounds.end
    }

    pub fn start_time_str(&self) -> String {
        day_label(self.bounds.start)
    }

    pub fn end_time_str(&self) -> String {
        day_label(self.bounds.end)
    }

    pub fn bounds(&self) -> IntervalBounds {
        self.bounds
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        in_half_open(ts, self.bounds.start, self.bounds.end)
    }

    pub fn series_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_univariate(&self) -> bool {
        self.columns.len() == 1
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> Option<&TimeSeries> {
        self.data.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    /// Records which interval precedes this one. Only the bounds are kept.
    pub fn set_previous_interval(&mut self, previous: &WindowedInterval) {
        self.previous_interval = Some(previous.bounds);
    }

    pub fn previous_interval(&self) -> Option<IntervalBounds> {
        self.previous_interval
    }

    pub fn spike_std_threshold(&self) -> f64 {
        self.spike_std_threshold
    }

    pub fn set_spike_std_threshold(&mut self, threshold: f64) -> StatsResult<()> {
        validate_spike_threshold(threshold)?;
        self.spike_std_threshold = threshold;
        self.invalidate_spikes();
        Ok(())
    }

    /// Drops the memoized spike set; the next [`Self::spikes`] call recomputes it.
    pub fn invalidate_spikes(&mut self) {
        self.spikes.take();
    }

    pub fn has_cached_spikes(&self) -> bool {
        self.spikes.get().is_some()
    }

    /// Replaces the table with the rows of `series` inside the bound.
    ///
    /// The interval takes its column list from `series`.
    pub fn bind(&mut self, series: &TimeSeries) {
        self.columns = series.columns().to_vec();
        let table = series.restrict(self.bounds.start, self.bounds.end);
        tracing::debug!(
            start = %self.bounds.start,
            end = %self.bounds.end,
            rows_in = series.len(),
            rows_kept = table.len(),
            series_count = self.columns.len(),
            "interval bound"
        );
        self.data = Some(table);
        self.invalidate_spikes();
    }

    /// Appends `series` to the current table and re-applies the bound.
    /// Columns must match the interval's columns.
    pub fn extend(&mut self, series: &TimeSeries) -> StatsResult<()> {
        if series.columns() != self.columns.as_slice() {
            return Err(StatsError::ColumnMismatch {
                expected: self.columns.clone(),
                actual: series.columns().to_vec(),
            });
        }
        let mut table = self
            .data
            .take()
            .unwrap_or_else(|| TimeSeries::empty_like(&self.columns));
        let rows_before = table.len();
        table.extend(series, false)?;
        let table = table.restrict(self.bounds.start, self.bounds.end);
        tracing::debug!(
            start = %self.bounds.start,
            end = %self.bounds.end,
            rows_before,
            rows_total = table.len(),
            "interval extended"
        );
        self.data = Some(table);
        self.invalidate_spikes();
        Ok(())
    }

    pub fn length(&self) -> usize {
        self.data.as_ref().map(TimeSeries::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    pub fn mean(&self) -> PerSeries<f64> {
        self.per_column(mean)
    }

    /// Unbiased sample variance per column; 0 with fewer than two rows.
    pub fn variance(&self) -> PerSeries<f64> {
        self.per_column(sample_variance)
    }

    /// Values of column `idx`; empty when unbound.
    pub fn column_values(&self, idx: usize) -> &[f64] {
        self.data
            .as_ref()
            .and_then(|table| table.column(idx))
            .unwrap_or(&[])
    }

    pub fn spikes(&self) -> StatsResult<&SpikeSet> {
        if let Some(cached) = self.spikes.get() {
            return Ok(cached);
        }
        let detected = self.detect_spikes()?;
        Ok(self.spikes.get_or_init(|| detected))
    }

    fn detect_spikes(&self) -> StatsResult<SpikeSet> {
        let Some(table) = self.data.as_ref() else {
            return Err(StatsError::Unbound {
                start: self.bounds.start,
                end: self.bounds.end,
            });
        };
        let means = self.mean();
        let variances = self.variance();
        let threshold = self.spike_std_threshold;

        let column_spikes = |idx: usize| -> Vec<SingleSpike> {
            let values = table.column(idx).unwrap_or(&[]);
            let std_dev = variances[idx].sqrt();
            table
                .time()
                .iter()
                .zip(values)
                .filter_map(|(ts, value)| {
                    let n_sigma = (value - means[idx]) / std_dev;
                    // NaN (zero variance, value at the mean) never qualifies.
                    (n_sigma >= threshold).then_some(SingleSpike {
                        time: *ts,
                        value: *value,
                        n_sigma,
                    })
                })
                .collect()
        };

        let set = if self.is_univariate() {
            SpikeSet::Univariate(column_spikes(0))
        } else {
            SpikeSet::Multivariate(
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(idx, column)| ColumnSpikes {
                        column: column.clone(),
                        spikes: column_spikes(idx),
                    })
                    .filter(|entry| !entry.spikes.is_empty())
                    .collect(),
            )
        };
        tracing::debug!(
            start = %self.bounds.start,
            threshold,
            spikes = set.total(),
            "spike detection"
        );
        Ok(set)
    }

    fn per_column(&self, f: impl Fn(&[f64]) -> f64) -> PerSeries<f64> {
        (0..self.columns.len())
            .map(|idx| f(self.column_values(idx)))
            .collect::<Vec<_>>()
            .into()
    }
}
