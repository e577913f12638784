use crate::error::{StatsError, StatsResult};
use serde::Serialize;
use std::ops::Index;

/// One value per series, positionally aligned with the owning interval's columns.
///
/// Univariate results are the length-1 case. [`PerSeries::scalar`] and
/// [`PerSeries::vector`] enforce the shape a caller expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PerSeries<T> {
    values: Vec<T>,
}

impl<T> PerSeries<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_univariate(&self) -> bool {
        self.values.len() == 1
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.values.get(idx)
    }

    /// Vector view; fails for a univariate value.
    pub fn vector(&self) -> StatsResult<&[T]> {
        if self.values.len() == 1 {
            return Err(StatsError::ShapeMismatch {
                expected: 2,
                actual: 1,
            });
        }
        Ok(&self.values)
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> PerSeries<U> {
        PerSeries {
            values: self.values.iter().map(f).collect(),
        }
    }

    pub fn zip_with<U, V>(&self, other: &PerSeries<U>, mut f: impl FnMut(&T, &U) -> V) -> PerSeries<V> {
        PerSeries {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T: Copy> PerSeries<T> {
    pub fn splat(value: T, len: usize) -> Self {
        Self {
            values: vec![value; len],
        }
    }

    /// Scalar view; fails unless exactly one series is present.
    pub fn scalar(&self) -> StatsResult<T> {
        match self.values.as_slice() {
            [value] => Ok(*value),
            other => Err(StatsError::ShapeMismatch {
                expected: 1,
                actual: other.len(),
            }),
        }
    }
}

impl<T> Index<usize> for PerSeries<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.values[idx]
    }
}

impl<T> From<Vec<T>> for PerSeries<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

impl<'a, T> IntoIterator for &'a PerSeries<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
