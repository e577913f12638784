//! Minimal aligned time-series container.
//!
//! A [`TimeSeries`] holds one timestamp column and one or more named value
//! columns of the same length. A single-column series is univariate; its column
//! is conventionally named `value`.

use crate::error::{StatsError, StatsResult};
use crate::time::in_half_open;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

pub const UNIVARIATE_COLUMN: &str = "value";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    time: Vec<DateTime<Utc>>,
    columns: Vec<String>,
    /// Column-major values, `values[c][row]`.
    values: Vec<Vec<f64>>,
}

/// One row of a flattened [`TimeSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    pub time: DateTime<Utc>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn univariate(time: Vec<DateTime<Utc>>, values: Vec<f64>) -> StatsResult<Self> {
        if values.len() != time.len() {
            return Err(StatsError::LengthMismatch {
                column: UNIVARIATE_COLUMN.to_string(),
                expected: time.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            time,
            columns: vec![UNIVARIATE_COLUMN.to_string()],
            values: vec![values],
        })
    }

    pub fn multivariate(
        time: Vec<DateTime<Utc>>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> StatsResult<Self> {
        if columns.is_empty() {
            return Err(StatsError::EmptyColumns);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for (name, values) in &columns {
            if name.trim().is_empty() {
                return Err(StatsError::EmptyColumns);
            }
            if !seen.insert(name.as_str()) {
                return Err(StatsError::DuplicateColumn(name.clone()));
            }
            if values.len() != time.len() {
                return Err(StatsError::LengthMismatch {
                    column: name.clone(),
                    expected: time.len(),
                    actual: values.len(),
                });
            }
        }
        let (names, values) = columns.into_iter().unzip();
        Ok(Self {
            time,
            columns: names,
            values,
        })
    }

    /// An empty series with the given column layout.
    pub fn empty_like(columns: &[String]) -> Self {
        Self {
            time: Vec::new(),
            columns: columns.to_vec(),
            values: vec![Vec::new(); columns.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn is_univariate(&self) -> bool {
        self.columns.len() == 1
    }

    pub fn series_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn time(&self) -> &[DateTime<Utc>] {
        &self.time
    }

    pub fn column(&self, idx: usize) -> Option<&[f64]> {
        self.values.get(idx).map(Vec::as_slice)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&[f64]> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.column(idx)
    }

    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.time.first().copied()
    }

    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.time.last().copied()
    }

    /// Rows with `start <= time < end`, in their original order.
    pub fn restrict(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let keep: Vec<usize> = self
            .time
            .iter()
            .enumerate()
            .filter(|(_, ts)| in_half_open(**ts, start, end))
            .map(|(idx, _)| idx)
            .collect();
        self.select_rows(&keep)
    }

    /// The trailing `n` rows (all rows when `n >= len`).
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.len().saturating_sub(n);
        Self {
            time: self.time[skip..].to_vec(),
            columns: self.columns.clone(),
            values: self.values.iter().map(|col| col[skip..].to_vec()).collect(),
        }
    }

    pub fn to_rows(&self) -> Vec<TimeSeriesRow> {
        self.time
            .iter()
            .enumerate()
            .map(|(row, ts)| TimeSeriesRow {
                time: *ts,
                values: self.values.iter().map(|col| col[row]).collect(),
            })
            .collect()
    }

    /// Appends `other`'s rows. Column layouts must match.
    ///
    /// With `validate`, the combined timestamps must be strictly increasing,
    /// which also rules out overlap between the two series.
    pub fn extend(&mut self, other: &TimeSeries, validate: bool) -> StatsResult<()> {
        if self.columns != other.columns {
            return Err(StatsError::ColumnMismatch {
                expected: self.columns.clone(),
                actual: other.columns.clone(),
            });
        }
        if validate {
            let boundary = self.time.last().into_iter().chain(other.time.iter());
            check_strictly_increasing(boundary)?;
        }
        self.time.extend_from_slice(&other.time);
        for (col, extra) in self.values.iter_mut().zip(&other.values) {
            col.extend_from_slice(extra);
        }
        Ok(())
    }

    /// Drops the oldest row and appends one, keeping the length fixed.
    /// An empty series just receives the row.
    pub fn shift_push(&mut self, time: DateTime<Utc>, values: &[f64]) -> StatsResult<()> {
        self.check_width(values)?;
        if !self.time.is_empty() {
            self.time.remove(0);
            for col in &mut self.values {
                col.remove(0);
            }
        }
        self.time.push(time);
        for (col, value) in self.values.iter_mut().zip(values) {
            col.push(*value);
        }
        Ok(())
    }

    /// Overwrites the row stamped `time`. Returns whether a row matched.
    pub fn overwrite_at(&mut self, time: DateTime<Utc>, values: &[f64]) -> StatsResult<bool> {
        self.check_width(values)?;
        let mut matched = false;
        for row in 0..self.time.len() {
            if self.time[row] != time {
                continue;
            }
            for (col, value) in self.values.iter_mut().zip(values) {
                col[row] = *value;
            }
            matched = true;
        }
        Ok(matched)
    }

    fn check_width(&self, values: &[f64]) -> StatsResult<()> {
        if values.len() != self.columns.len() {
            return Err(StatsError::ShapeMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        Ok(())
    }

    fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            time: rows.iter().map(|&r| self.time[r]).collect(),
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|col| rows.iter().map(|&r| col[r]).collect())
                .collect(),
        }
    }
}

fn check_strictly_increasing<'a>(
    times: impl Iterator<Item = &'a DateTime<Utc>>,
) -> StatsResult<()> {
    let mut prev: Option<DateTime<Utc>> = None;
    for ts in times {
        if let Some(previous) = prev {
            if *ts <= previous {
                return Err(StatsError::NonMonotonicTime {
                    previous,
                    next: *ts,
                });
            }
        }
        prev = Some(*ts);
    }
    Ok(())
}
