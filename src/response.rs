//! Fixed-length bundle of detector output series.
//!
//! Every present component (scores, confidence band, prediction, anomaly
//! magnitude, significance) shares the same timestamps. Optional components
//! are fixed at construction: absent ones stay absent through updates and
//! must be absent on both sides of an [`RollingResponse::extend`].

use crate::comparator::IntervalComparator;
use crate::error::{StatsError, StatsResult};
use crate::series::TimeSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceBand {
    pub lower: TimeSeries,
    pub upper: TimeSeries,
}

/// Values for one timestamp, one entry per series in each component.
///
/// Components the response does not carry are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePoint {
    pub time: DateTime<Utc>,
    pub score: Vec<f64>,
    pub ci_upper: Vec<f64>,
    pub ci_lower: Vec<f64>,
    pub predicted: Vec<f64>,
    pub anomaly_magnitude: Vec<f64>,
    pub stat_sig: Vec<f64>,
}

impl ResponsePoint {
    pub fn univariate(
        time: DateTime<Utc>,
        score: f64,
        ci_upper: f64,
        ci_lower: f64,
        predicted: f64,
        anomaly_magnitude: f64,
        stat_sig: f64,
    ) -> Self {
        Self {
            time,
            score: vec![score],
            ci_upper: vec![ci_upper],
            ci_lower: vec![ci_lower],
            predicted: vec![predicted],
            anomaly_magnitude: vec![anomaly_magnitude],
            stat_sig: vec![stat_sig],
        }
    }

    /// Point built from a comparison: the previous mean is the prediction and
    /// the mean difference is the anomaly magnitude.
    pub fn from_comparator(time: DateTime<Utc>, cmp: &IntervalComparator<'_>) -> Self {
        Self {
            time,
            score: cmp.score().into_vec(),
            ci_upper: cmp.ci_upper().into_vec(),
            ci_lower: cmp.ci_lower().into_vec(),
            predicted: cmp.mean_previous().into_vec(),
            anomaly_magnitude: cmp.mean_difference().into_vec(),
            stat_sig: cmp
                .stat_sig()
                .iter()
                .map(|sig| if *sig { 1.0 } else { 0.0 })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingResponse {
    scores: TimeSeries,
    confidence_band: Option<ConfidenceBand>,
    predicted: Option<TimeSeries>,
    anomaly_magnitude: TimeSeries,
    stat_sig: Option<TimeSeries>,
    series_count: usize,
    key_mapping: Vec<String>,
}

impl RollingResponse {
    pub fn new(
        scores: TimeSeries,
        confidence_band: Option<ConfidenceBand>,
        predicted: Option<TimeSeries>,
        anomaly_magnitude: TimeSeries,
        stat_sig: Option<TimeSeries>,
    ) -> StatsResult<Self> {
        let (series_count, key_mapping) = if scores.is_univariate() {
            (1, Vec::new())
        } else {
            (scores.series_count(), scores.columns().to_vec())
        };
        let response = Self {
            scores,
            confidence_band,
            predicted,
            anomaly_magnitude,
            stat_sig,
            series_count,
            key_mapping,
        };
        response.check_alignment()?;
        Ok(response)
    }

    pub fn scores(&self) -> &TimeSeries {
        &self.scores
    }

    pub fn confidence_band(&self) -> Option<&ConfidenceBand> {
        self.confidence_band.as_ref()
    }

    pub fn predicted(&self) -> Option<&TimeSeries> {
        self.predicted.as_ref()
    }

    pub fn anomaly_magnitude(&self) -> &TimeSeries {
        &self.anomaly_magnitude
    }

    pub fn stat_sig(&self) -> Option<&TimeSeries> {
        self.stat_sig.as_ref()
    }

    pub fn series_count(&self) -> usize {
        self.series_count
    }

    /// Column names of a multivariate response; empty when univariate.
    pub fn key_mapping(&self) -> &[String] {
        &self.key_mapping
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.scores.last_time()
    }

    /// Copy of this response advanced by one point: the oldest point of every
    /// present component is dropped and `point` appended.
    pub fn update(&self, point: &ResponsePoint) -> StatsResult<Self> {
        self.check_point(point)?;
        let mut next = self.clone();
        next.scores.shift_push(point.time, &point.score)?;
        if let Some(band) = next.confidence_band.as_mut() {
            band.lower.shift_push(point.time, &point.ci_lower)?;
            band.upper.shift_push(point.time, &point.ci_upper)?;
        }
        if let Some(predicted) = next.predicted.as_mut() {
            predicted.shift_push(point.time, &point.predicted)?;
        }
        next.anomaly_magnitude
            .shift_push(point.time, &point.anomaly_magnitude)?;
        if let Some(stat_sig) = next.stat_sig.as_mut() {
            stat_sig.shift_push(point.time, &point.stat_sig)?;
        }
        Ok(next)
    }

    /// Overwrites the values stamped `point.time` in place.
    ///
    /// Returns `false`, changing nothing, when no point carries that timestamp.
    pub fn inplace_update(&mut self, point: &ResponsePoint) -> StatsResult<bool> {
        self.check_point(point)?;
        let matched = self.scores.overwrite_at(point.time, &point.score)?;
        if !matched {
            tracing::debug!(time = %point.time, "no response point at timestamp; nothing updated");
            return Ok(false);
        }
        if let Some(band) = self.confidence_band.as_mut() {
            band.lower.overwrite_at(point.time, &point.ci_lower)?;
            band.upper.overwrite_at(point.time, &point.ci_upper)?;
        }
        if let Some(predicted) = self.predicted.as_mut() {
            predicted.overwrite_at(point.time, &point.predicted)?;
        }
        self.anomaly_magnitude
            .overwrite_at(point.time, &point.anomaly_magnitude)?;
        if let Some(stat_sig) = self.stat_sig.as_mut() {
            stat_sig.overwrite_at(point.time, &point.stat_sig)?;
        }
        Ok(true)
    }

    /// The last `n` points of every present component.
    pub fn slice_last(&self, n: usize) -> Self {
        Self {
            scores: self.scores.tail(n),
            confidence_band: self.confidence_band.as_ref().map(|band| ConfidenceBand {
                lower: band.lower.tail(n),
                upper: band.upper.tail(n),
            }),
            predicted: self.predicted.as_ref().map(|ts| ts.tail(n)),
            anomaly_magnitude: self.anomaly_magnitude.tail(n),
            stat_sig: self.stat_sig.as_ref().map(|ts| ts.tail(n)),
            series_count: self.series_count,
            key_mapping: self.key_mapping.clone(),
        }
    }

    /// Appends `other` component-wise. Either every component extends or
    /// none does.
    ///
    /// With `validate`, timestamps must keep strictly increasing across the
    /// join.
    pub fn extend(&mut self, other: &RollingResponse, validate: bool) -> StatsResult<()> {
        let checks = [
            (
                "confidence_band",
                self.confidence_band.is_some(),
                other.confidence_band.is_some(),
            ),
            ("predicted", self.predicted.is_some(), other.predicted.is_some()),
            ("stat_sig", self.stat_sig.is_some(), other.stat_sig.is_some()),
        ];
        for (component, ours, theirs) in checks {
            if ours != theirs {
                tracing::warn!(component, "refusing to extend response with asymmetric components");
                return Err(StatsError::ComponentMismatch { component });
            }
        }

        let mut merged = self.clone();
        merged.scores.extend(&other.scores, validate)?;
        if let (Some(band), Some(other_band)) =
            (merged.confidence_band.as_mut(), other.confidence_band.as_ref())
        {
            band.upper.extend(&other_band.upper, validate)?;
            band.lower.extend(&other_band.lower, validate)?;
        }
        if let (Some(predicted), Some(other_predicted)) =
            (merged.predicted.as_mut(), other.predicted.as_ref())
        {
            predicted.extend(other_predicted, validate)?;
        }
        merged
            .anomaly_magnitude
            .extend(&other.anomaly_magnitude, validate)?;
        if let (Some(stat_sig), Some(other_stat_sig)) =
            (merged.stat_sig.as_mut(), other.stat_sig.as_ref())
        {
            stat_sig.extend(other_stat_sig, validate)?;
        }
        tracing::debug!(
            points_before = self.len(),
            points_after = merged.len(),
            validate,
            "response extended"
        );
        *self = merged;
        Ok(())
    }

    fn check_point(&self, point: &ResponsePoint) -> StatsResult<()> {
        let mut widths = vec![point.score.len(), point.anomaly_magnitude.len()];
        if self.confidence_band.is_some() {
            widths.push(point.ci_upper.len());
            widths.push(point.ci_lower.len());
        }
        if self.predicted.is_some() {
            widths.push(point.predicted.len());
        }
        if self.stat_sig.is_some() {
            widths.push(point.stat_sig.len());
        }
        match widths.into_iter().find(|w| *w != self.series_count) {
            Some(actual) => Err(StatsError::ShapeMismatch {
                expected: self.series_count,
                actual,
            }),
            None => Ok(()),
        }
    }

    fn check_alignment(&self) -> StatsResult<()> {
        let mut components: Vec<(&'static str, &TimeSeries)> =
            vec![("anomaly_magnitude", &self.anomaly_magnitude)];
        if let Some(band) = &self.confidence_band {
            components.push(("confidence_band", &band.lower));
            components.push(("confidence_band", &band.upper));
        }
        if let Some(predicted) = &self.predicted {
            components.push(("predicted", predicted));
        }
        if let Some(stat_sig) = &self.stat_sig {
            components.push(("stat_sig", stat_sig));
        }
        for (component, series) in components {
            if series.time() != self.scores.time()
                || series.series_count() != self.scores.series_count()
            {
                return Err(StatsError::MisalignedComponent { component });
            }
        }
        Ok(())
    }
}

impl fmt::Display for RollingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn rows(series: Option<&TimeSeries>) -> String {
            match series {
                Some(ts) => format!(
                    "{:?}",
                    ts.to_rows().into_iter().map(|r| r.values).collect::<Vec<_>>()
                ),
                None => "None".to_string(),
            }
        }
        let times: Vec<String> = self.scores.time().iter().map(|ts| ts.to_rfc3339()).collect();
        writeln!(f, "Time: {times:?},")?;
        writeln!(f, "Scores: {},", rows(Some(&self.scores)))?;
        writeln!(
            f,
            "Upper Confidence Bound: {},",
            rows(self.confidence_band.as_ref().map(|b| &b.upper))
        )?;
        writeln!(
            f,
            "Lower Confidence Bound: {},",
            rows(self.confidence_band.as_ref().map(|b| &b.lower))
        )?;
        writeln!(f, "Predicted Time Series: {},", rows(self.predicted.as_ref()))?;
        writeln!(f, "Anomaly Magnitude: {},", rows(Some(&self.anomaly_magnitude)))?;
        write!(f, "stat_sig: {}", rows(self.stat_sig.as_ref()))
    }
}
