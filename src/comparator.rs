//! Current-versus-previous interval comparison.
//!
//! The comparator reports the ratio of means with a delta-method confidence
//! interval, a pooled two-sample t-test, and for multivariate intervals a
//! jointly corrected set of p-values. Everything derived is computed on first
//! access and cached for the comparator's lifetime; the borrowed intervals
//! cannot change underneath it.

use crate::config::{ComparatorConfig, ALPHA};
use crate::error::{StatsError, StatsResult};
use crate::interval::WindowedInterval;
use crate::per_series::PerSeries;
use crate::stats::distribution::{
    normal_ppf, student_two_sample, students_t_ppf, students_t_two_sided_p,
};
use crate::stats::moments::{pooled_stddev, sample_covariance};
use crate::stats::multitest;
use serde::Serialize;
use std::cell::OnceCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct TTestOutcome {
    t_score: PerSeries<f64>,
    p_value: PerSeries<f64>,
}

#[derive(Debug, Clone)]
struct RatioBounds {
    lower: PerSeries<f64>,
    upper: PerSeries<f64>,
}

#[derive(Debug)]
pub struct IntervalComparator<'a> {
    current: &'a WindowedInterval,
    previous: &'a WindowedInterval,
    config: ComparatorConfig,
    ratio: OnceCell<PerSeries<f64>>,
    ttest: OnceCell<TTestOutcome>,
    bounds: OnceCell<RatioBounds>,
}

impl<'a> IntervalComparator<'a> {
    pub fn new(
        current: &'a WindowedInterval,
        previous: &'a WindowedInterval,
        config: ComparatorConfig,
    ) -> StatsResult<Self> {
        config.validate()?;
        if current.series_count() != previous.series_count() {
            return Err(StatsError::ShapeMismatch {
                expected: current.series_count(),
                actual: previous.series_count(),
            });
        }
        if current.is_bound() && previous.is_bound() && current.columns() != previous.columns() {
            return Err(StatsError::ColumnMismatch {
                expected: current.columns().to_vec(),
                actual: previous.columns().to_vec(),
            });
        }
        Ok(Self {
            current,
            previous,
            config,
            ratio: OnceCell::new(),
            ttest: OnceCell::new(),
            bounds: OnceCell::new(),
        })
    }

    pub fn current(&self) -> &'a WindowedInterval {
        self.current
    }

    pub fn previous(&self) -> &'a WindowedInterval {
        self.previous
    }

    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    pub fn series_count(&self) -> usize {
        self.current.series_count()
    }

    pub fn is_univariate(&self) -> bool {
        self.series_count() == 1
    }

    /// `current.mean / previous.mean` per series.
    pub fn ratio_estimate(&self) -> &PerSeries<f64> {
        self.ratio.get_or_init(|| {
            self.current
                .mean()
                .zip_with(&self.previous.mean(), |cur, prev| cur / prev)
        })
    }

    pub fn percent_change(&self) -> PerSeries<f64> {
        self.ratio_estimate().map(|r| to_percent(*r))
    }

    pub fn ratio_lower(&self) -> &PerSeries<f64> {
        &self.ratio_bounds().lower
    }

    pub fn ratio_upper(&self) -> &PerSeries<f64> {
        &self.ratio_bounds().upper
    }

    pub fn percent_change_lower(&self) -> PerSeries<f64> {
        self.ratio_lower().map(|r| to_percent(*r))
    }

    pub fn percent_change_upper(&self) -> PerSeries<f64> {
        self.ratio_upper().map(|r| to_percent(*r))
    }

    pub fn direction(&self) -> PerSeries<Direction> {
        self.percent_change().map(|pc| {
            if *pc > 0.0 {
                Direction::Up
            } else {
                Direction::Down
            }
        })
    }

    /// Not significant exactly when the ratio interval straddles 1,
    /// e.g. `[0.88, 1.55]`.
    pub fn stat_sig(&self) -> PerSeries<bool> {
        let bounds = self.ratio_bounds();
        bounds
            .upper
            .zip_with(&bounds.lower, |upper, lower| !(*upper > 1.0 && *lower < 1.0))
    }

    /// t-score as produced by the test (after any p-value rescaling), unclamped.
    pub fn t_score(&self) -> &PerSeries<f64> {
        &self.ttest().t_score
    }

    pub fn p_value(&self) -> &PerSeries<f64> {
        &self.ttest().p_value
    }

    /// t-score with positions below `min_perc_change` forced to zero.
    pub fn score(&self) -> PerSeries<f64> {
        let min_perc_change = self.config.min_perc_change;
        self.t_score()
            .zip_with(&self.percent_change(), |t, pc| {
                if pc.abs() < min_perc_change {
                    0.0
                } else {
                    *t
                }
            })
    }

    pub fn mean_previous(&self) -> PerSeries<f64> {
        self.previous.mean()
    }

    pub fn mean_difference(&self) -> PerSeries<f64> {
        self.current
            .mean()
            .zip_with(&self.previous.mean(), |cur, prev| cur - prev)
    }

    /// `n_previous + n_current - 2`; negative for empty windows.
    pub fn degrees_of_freedom(&self) -> f64 {
        (self.previous.length() + self.current.length()) as f64 - 2.0
    }

    pub fn pooled_stddev(&self) -> PerSeries<f64> {
        let (n1, n2) = (self.previous.length(), self.current.length());
        let corrected = self.config.use_corrected_scores;
        self.previous
            .variance()
            .zip_with(&self.current.variance(), |var_prev, var_cur| {
                pooled_stddev(n1, *var_prev, n2, *var_cur, corrected)
            })
    }

    /// Upper edge of the t interval around the previous mean.
    pub fn ci_upper(&self) -> PerSeries<f64> {
        // t⁻¹(α/2) is negative, hence the subtraction.
        let t_crit = students_t_ppf(ALPHA / 2.0, self.degrees_of_freedom());
        self.mean_previous()
            .zip_with(&self.pooled_stddev(), |mean, sp| mean - t_crit * sp)
    }

    pub fn ci_lower(&self) -> PerSeries<f64> {
        let t_crit = students_t_ppf(ALPHA / 2.0, self.degrees_of_freedom());
        self.mean_previous()
            .zip_with(&self.pooled_stddev(), |mean, sp| mean + t_crit * sp)
    }

    fn ttest(&self) -> &TTestOutcome {
        self.ttest.get_or_init(|| {
            if self.is_univariate() {
                self.ttest_univariate()
            } else {
                self.ttest_multivariate()
            }
        })
    }

    fn ttest_univariate(&self) -> TTestOutcome {
        let (n1, n2) = (self.previous.length(), self.current.length());
        if n1 == 1 && n2 == 1 {
            tracing::debug!("single point on both sides; t-test undefined");
            return TTestOutcome {
                t_score: PerSeries::splat(f64::NAN, 1),
                p_value: PerSeries::splat(0.0, 1),
            };
        }
        self.ttest_pooled()
    }

    fn ttest_multivariate(&self) -> TTestOutcome {
        let k = self.series_count();
        let (n1, n2) = (self.previous.length(), self.current.length());

        let raw = if n1 == 1 && n2 == 1 {
            tracing::debug!(series_count = k, "single point on both sides; t-test undefined");
            return TTestOutcome {
                t_score: PerSeries::splat(f64::INFINITY, k),
                p_value: PerSeries::splat(0.0, k),
            };
        } else if n1 == 1 || n2 == 1 {
            tracing::debug!(n_previous = n1, n_current = n2, "single-point side; pooled t-test");
            self.ttest_pooled()
        } else {
            let (t, p): (Vec<f64>, Vec<f64>) = (0..k)
                .map(|idx| {
                    student_two_sample(
                        self.current.column_values(idx),
                        self.previous.column_values(idx),
                    )
                })
                .unzip();
            TTestOutcome {
                t_score: t.into(),
                p_value: p.into(),
            }
        };

        if self.config.skip_rescaling {
            return raw;
        }
        self.rescale(raw)
    }

    /// Replaces p-values with their jointly corrected values and maps each
    /// back to a t-score on the side of the original statistic.
    fn rescale(&self, raw: TTestOutcome) -> TTestOutcome {
        let correction = multitest::correct(self.config.method, raw.p_value.as_slice(), ALPHA);
        let df = self.degrees_of_freedom();
        let t_score: Vec<f64> = raw
            .t_score
            .iter()
            .zip(&correction.adjusted)
            .map(|(t_raw, p)| {
                if *t_raw < 0.0 {
                    students_t_ppf(p / 2.0, df)
                } else {
                    students_t_ppf(1.0 - p / 2.0, df)
                }
            })
            .collect();
        tracing::debug!(
            method = %self.config.method,
            series_count = t_score.len(),
            rejected = correction.rejected.iter().filter(|r| **r).count(),
            "p-values corrected across series"
        );
        TTestOutcome {
            t_score: t_score.into(),
            p_value: correction.adjusted.into(),
        }
    }

    /// t-test on the pooled standard deviation, usable when a side has one point.
    fn ttest_pooled(&self) -> TTestOutcome {
        let df = self.degrees_of_freedom();
        let t_score = self
            .mean_difference()
            .zip_with(&self.pooled_stddev(), |diff, sp| diff / sp);
        let p_value = t_score.map(|t| students_t_two_sided_p(*t, df));
        TTestOutcome { t_score, p_value }
    }

    fn ratio_bounds(&self) -> &RatioBounds {
        self.bounds.get_or_init(|| self.delta_method())
    }

    /// First-order Taylor approximation of `Var(mean_cur / mean_prev)`.
    fn delta_method(&self) -> RatioBounds {
        let test_mean = self.current.mean();
        let control_mean = self.previous.mean();
        let test_var = self.current.variance();
        let control_var = self.previous.variance();
        let n_test = self.current.length() as f64;
        let n_control = self.previous.length() as f64;
        let cov_xy = self.covariance();
        let ratio = self.ratio_estimate();
        let z = normal_ppf(ALPHA / 2.0);

        let mut lower = Vec::with_capacity(ratio.len());
        let mut upper = Vec::with_capacity(ratio.len());
        for idx in 0..ratio.len() {
            let (tm, cm) = (test_mean[idx], control_mean[idx]);
            let sigma_sq_ratio = test_var[idx] / (n_test * cm.powi(2))
                - 2.0 * (tm * cov_xy[idx]) / cm.powi(3)
                + (control_var[idx] * tm.powi(2)) / (n_control * cm.powi(4));
            // The estimate can dip below zero; use its magnitude.
            let half_width = z * sigma_sq_ratio.abs().sqrt();
            // z < 0, so these read flipped.
            lower.push(ratio[idx] + half_width);
            upper.push(ratio[idx] - half_width);
        }
        RatioBounds {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// Covariance of the trailing `min(n1, n2)` rows of both intervals,
    /// divided by that row count.
    fn covariance(&self) -> PerSeries<f64> {
        let k = self.series_count();
        let n_min = self.current.length().min(self.previous.length());
        if n_min == 0 {
            return PerSeries::splat(f64::NAN, k);
        }
        (0..k)
            .map(|idx| {
                let cur = self.current.column_values(idx);
                let prev = self.previous.column_values(idx);
                let cur = &cur[cur.len() - n_min..];
                let prev = &prev[prev.len() - n_min..];
                sample_covariance(cur, prev) / (n_min as f64)
            })
            .collect::<Vec<_>>()
            .into()
    }
}

fn to_percent(ratio: f64) -> f64 {
    (ratio - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorrectionMethod;
    use crate::series::TimeSeries;
    use crate::test_support::{assert_close, daily_multi, daily_series, day, init_tracing};

    fn bound(start: i64, end: i64, series: &TimeSeries) -> WindowedInterval {
        let mut iv = WindowedInterval::new(day(start), day(end)).expect("interval");
        iv.bind(series);
        iv
    }

    /// previous = days [0, n), current = days [n, n + m)
    fn pair(previous: &[f64], current: &[f64]) -> (WindowedInterval, WindowedInterval) {
        let n = previous.len() as i64;
        let m = current.len() as i64;
        let mut all = previous.to_vec();
        all.extend_from_slice(current);
        let series = daily_series(0, &all);
        (bound(n, n + m, &series), bound(0, n, &series))
    }

    #[test]
    fn doubling_is_up_by_one_hundred_percent() {
        let (cur, prev) = pair(&[10.0, 10.0, 10.0], &[20.0, 20.0, 20.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        assert_eq!(cmp.ratio_estimate().scalar(), Ok(2.0));
        assert_eq!(cmp.percent_change().scalar(), Ok(100.0));
        assert_eq!(cmp.direction().scalar(), Ok(Direction::Up));
        assert_eq!(cmp.direction()[0].to_string(), "up");
        // zero variance on both sides: infinite t, zero p
        assert_eq!(cmp.t_score().scalar(), Ok(f64::INFINITY));
        assert_eq!(cmp.p_value().scalar(), Ok(0.0));
        assert_eq!(cmp.stat_sig().scalar(), Ok(true));
    }

    #[test]
    fn percent_change_is_exactly_derived_from_ratio() {
        let (cur, prev) = pair(&[3.0, 7.0, 11.0, 2.0], &[5.0, 1.0, 9.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        let ratio = cmp.ratio_estimate().scalar().expect("scalar");
        assert_eq!(cmp.percent_change().scalar(), Ok((ratio - 1.0) * 100.0));
        assert_eq!(cmp.direction().scalar(), Ok(Direction::Down));
    }

    #[test]
    fn single_points_univariate_give_nan_t_and_zero_p() {
        init_tracing();
        let (cur, prev) = pair(&[4.0], &[9.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        assert!(cmp.t_score().scalar().expect("scalar").is_nan());
        assert_eq!(cmp.p_value().scalar(), Ok(0.0));
        assert!(cmp.score().scalar().expect("scalar").is_nan());
    }

    #[test]
    fn single_points_multivariate_give_infinite_t_and_zero_p() {
        let series = daily_multi(0, vec![("a", vec![1.0, 2.0]), ("b", vec![3.0, 5.0])]);
        let prev = bound(0, 1, &series);
        let cur = bound(1, 2, &series);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        assert_eq!(cmp.t_score().as_slice(), &[f64::INFINITY, f64::INFINITY]);
        assert_eq!(cmp.p_value().as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn pooled_t_test_uses_uncorrected_std_by_default() {
        let (cur, prev) = pair(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        assert_eq!(cmp.degrees_of_freedom(), 4.0);
        assert_close(cmp.t_score()[0], 3.0, 1e-12);
        assert_close(cmp.p_value()[0], students_t_two_sided_p(3.0, 4.0), 1e-12);

        let corrected = IntervalComparator::new(
            &cur,
            &prev,
            ComparatorConfig {
                use_corrected_scores: true,
                ..ComparatorConfig::default()
            },
        )
        .expect("cmp");
        assert_close(corrected.t_score()[0], 3.0 / (2.0_f64 / 3.0).sqrt(), 1e-12);
        assert!(corrected.p_value()[0] < cmp.p_value()[0]);
    }

    #[test]
    fn one_sided_single_point_uses_pooled_formula() {
        let (cur, prev) = pair(&[1.0, 2.0, 3.0], &[10.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        // s_p = sqrt((2 * 1 + 0) / 2) = 1
        assert_close(cmp.pooled_stddev()[0], 1.0, 1e-12);
        assert_close(cmp.t_score()[0], 8.0, 1e-12);
        assert!(cmp.p_value()[0] > 0.0 && cmp.p_value()[0] < 0.05);
    }

    #[test]
    fn empty_previous_window_does_not_panic() {
        let (cur, _) = pair(&[1.0, 2.0], &[3.0, 4.0]);
        let prev = WindowedInterval::new(day(50), day(60)).expect("interval");
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        assert_eq!(cmp.ratio_estimate()[0], f64::INFINITY);
        assert_eq!(cmp.pooled_stddev()[0], 0.0);
        assert!(cmp.ratio_lower()[0].is_nan());
    }

    #[test]
    fn score_is_clamped_below_min_percent_change() {
        let (cur, prev) = pair(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        let loose = IntervalComparator::new(
            &cur,
            &prev,
            ComparatorConfig {
                min_perc_change: 100.0,
                ..ComparatorConfig::default()
            },
        )
        .expect("cmp");
        // percent change is 150
        assert_close(loose.score()[0], 3.0, 1e-12);

        let strict = IntervalComparator::new(
            &cur,
            &prev,
            ComparatorConfig {
                min_perc_change: 200.0,
                ..ComparatorConfig::default()
            },
        )
        .expect("cmp");
        assert_eq!(strict.score().scalar(), Ok(0.0));
        assert_close(strict.t_score()[0], 3.0, 1e-12);
    }

    #[test]
    fn delta_method_interval_matches_hand_computation() {
        let (cur, prev) = pair(&[1.0, 2.0, 3.0, 4.0], &[8.0, 6.0, 4.0, 2.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        // means 5 / 2.5, variances 20/3 and 5/3, cov = (-10/3) / 4
        let cov: f64 = -10.0 / 3.0 / 4.0;
        let sigma_sq = (20.0 / 3.0) / (4.0 * 6.25) - 2.0 * 5.0 * cov / 15.625
            + (5.0 / 3.0) * 25.0 / (4.0 * 39.0625);
        let half = normal_ppf(0.025) * sigma_sq.sqrt();
        assert_close(cmp.ratio_lower()[0], 2.0 + half, 1e-9);
        assert_close(cmp.ratio_upper()[0], 2.0 - half, 1e-9);
        assert!(cmp.ratio_lower()[0] < 1.0 && cmp.ratio_upper()[0] > 1.0);
        assert_eq!(cmp.stat_sig().scalar(), Ok(false));
        assert_close(
            cmp.percent_change_upper()[0],
            (cmp.ratio_upper()[0] - 1.0) * 100.0,
            1e-12,
        );
    }

    #[test]
    fn perfectly_correlated_windows_collapse_the_interval() {
        let (cur, prev) = pair(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        // sigma² cancels to rounding noise
        assert_close(cmp.ratio_lower()[0], 2.0, 1e-6);
        assert_close(cmp.ratio_upper()[0], 2.0, 1e-6);
        assert_eq!(cmp.stat_sig().scalar(), Ok(true));
    }

    #[test]
    fn ci_on_previous_mean_uses_t_critical_value() {
        let (cur, prev) = pair(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        let t_crit = students_t_ppf(0.025, 4.0);
        assert!(t_crit < 0.0);
        assert_close(cmp.ci_upper()[0], 2.0 - t_crit, 1e-12);
        assert_close(cmp.ci_lower()[0], 2.0 + t_crit, 1e-12);
        assert_close(cmp.mean_difference()[0], 3.0, 1e-12);
    }

    fn three_column_pair() -> (WindowedInterval, WindowedInterval) {
        let series = daily_multi(
            0,
            vec![
                ("a", vec![1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0, 6.0]),
                ("b", vec![5.0, 6.0, 7.0, 8.0, 5.5, 6.5, 7.5, 8.5]),
                ("c", vec![2.0, 4.0, 6.0, 8.0, 9.0, 11.0, 13.0, 15.0]),
            ],
        );
        (bound(4, 8, &series), bound(0, 4, &series))
    }

    #[test]
    fn skip_rescaling_passes_raw_column_tests_through() {
        let (cur, prev) = three_column_pair();
        let cmp = IntervalComparator::new(
            &cur,
            &prev,
            ComparatorConfig {
                skip_rescaling: true,
                ..ComparatorConfig::default()
            },
        )
        .expect("cmp");
        assert_eq!(cmp.p_value().len(), 3);
        for idx in 0..3 {
            let (t, p) = student_two_sample(cur.column_values(idx), prev.column_values(idx));
            assert_close(cmp.t_score()[idx], t, 1e-12);
            assert_close(cmp.p_value()[idx], p, 1e-12);
        }
    }

    #[test]
    fn multiple_testing_correction_adjusts_only_when_enabled() {
        init_tracing();
        let (cur, prev) = three_column_pair();
        let raw = IntervalComparator::new(
            &cur,
            &prev,
            ComparatorConfig {
                skip_rescaling: true,
                ..ComparatorConfig::default()
            },
        )
        .expect("cmp");
        let corrected =
            IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        assert_eq!(corrected.config().method, CorrectionMethod::FdrBh);
        assert_eq!(corrected.p_value().len(), 3);

        let expected = multitest::correct(CorrectionMethod::FdrBh, raw.p_value().as_slice(), ALPHA);
        let mut differing = 0;
        for idx in 0..3 {
            let p_raw = raw.p_value()[idx];
            let p_adj = corrected.p_value()[idx];
            assert_close(p_adj, expected.adjusted[idx], 1e-12);
            assert!(p_adj >= p_raw - 1e-12);
            if (p_adj - p_raw).abs() > 1e-9 {
                differing += 1;
                assert!(corrected.t_score()[idx].abs() < raw.t_score()[idx].abs());
            }
            // reconstructed t reproduces the adjusted p-value
            let df = corrected.degrees_of_freedom();
            assert_close(
                students_t_two_sided_p(corrected.t_score()[idx], df),
                p_adj,
                1e-6,
            );
            assert_eq!(
                corrected.t_score()[idx].signum(),
                raw.t_score()[idx].signum()
            );
        }
        assert!(differing >= 1);
    }

    #[test]
    fn multivariate_single_point_side_uses_pooled_formula_per_column() {
        let series = daily_multi(
            0,
            vec![("a", vec![1.0, 2.0, 3.0, 10.0]), ("b", vec![4.0, 4.0, 4.0, 4.0])],
        );
        let prev = bound(0, 3, &series);
        let cur = bound(3, 4, &series);
        let cmp = IntervalComparator::new(
            &cur,
            &prev,
            ComparatorConfig {
                skip_rescaling: true,
                ..ComparatorConfig::default()
            },
        )
        .expect("cmp");
        assert_close(cmp.t_score()[0], 8.0, 1e-12);
        // 0 / 0 on the constant column
        assert!(cmp.t_score()[1].is_nan());
        assert_eq!(cmp.direction().as_slice(), &[Direction::Up, Direction::Down]);
        assert_eq!(cmp.stat_sig().len(), 2);
        assert!(cmp.score().scalar().is_err());
    }

    #[test]
    fn mismatched_series_counts_are_rejected() {
        let (cur, _) = three_column_pair();
        let (_, prev) = pair(&[1.0, 2.0], &[3.0]);
        let err = IntervalComparator::new(&cur, &prev, ComparatorConfig::default())
            .expect_err("shape");
        assert_eq!(
            err,
            StatsError::ShapeMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn mismatched_column_names_are_rejected() {
        let current = daily_multi(0, vec![("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])]);
        let previous = daily_multi(0, vec![("a", vec![1.0, 2.0]), ("z", vec![3.0, 4.0])]);
        let cur = bound(0, 2, &current);
        let prev = bound(0, 2, &previous);
        let err = IntervalComparator::new(&cur, &prev, ComparatorConfig::default())
            .expect_err("columns");
        assert_eq!(
            err,
            StatsError::ColumnMismatch {
                expected: vec!["a".to_string(), "b".to_string()],
                actual: vec!["a".to_string(), "z".to_string()],
            }
        );
    }

    #[test]
    fn multivariate_ratio_bounds_match_each_column_alone() {
        let up = [10.0, 11.0, 9.0, 10.0, 20.0, 21.0, 19.0, 20.0];
        let flat = [1.0, 2.0, 3.0, 4.0, 8.0, 6.0, 4.0, 2.0];
        let series = daily_multi(0, vec![("up", up.to_vec()), ("flat", flat.to_vec())]);
        let (cur, prev) = (bound(4, 8, &series), bound(0, 4, &series));
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        assert_eq!(cmp.stat_sig().as_slice(), &[true, false]);

        for (idx, values) in [up, flat].iter().enumerate() {
            let single = daily_series(0, values);
            let (single_cur, single_prev) = (bound(4, 8, &single), bound(0, 4, &single));
            let alone = IntervalComparator::new(
                &single_cur,
                &single_prev,
                ComparatorConfig::default(),
            )
            .expect("cmp");
            assert_close(cmp.ratio_estimate()[idx], alone.ratio_estimate()[0], 1e-12);
            assert_close(cmp.ratio_lower()[idx], alone.ratio_lower()[0], 1e-12);
            assert_close(cmp.ratio_upper()[idx], alone.ratio_upper()[0], 1e-12);
            assert_close(cmp.ci_upper()[idx], alone.ci_upper()[0], 1e-12);
            assert_close(cmp.ci_lower()[idx], alone.ci_lower()[0], 1e-12);
            assert_eq!(cmp.stat_sig()[idx], alone.stat_sig()[0]);
        }
    }

    #[test]
    fn derived_values_are_cached() {
        let (cur, prev) = pair(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        let cmp = IntervalComparator::new(&cur, &prev, ComparatorConfig::default()).expect("cmp");
        assert!(std::ptr::eq(cmp.t_score(), cmp.t_score()));
        assert!(std::ptr::eq(cmp.ratio_upper(), cmp.ratio_upper()));
        assert!(std::ptr::eq(cmp.ratio_estimate(), cmp.ratio_estimate()));
    }
}
