use crate::stats::moments::{mean, pooled_stddev, sample_variance};
use statrs::distribution::{Continuous, ContinuousCDF, Normal, StudentsT};

/// Two-sided p-value of a t statistic, `2 * (1 - CDF(|t|))`.
///
/// NaN for a NaN statistic or non-positive degrees of freedom; 0 for an
/// infinite statistic.
pub fn students_t_two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    let Ok(dist) = StudentsT::new(0.0, 1.0, df) else {
        return f64::NAN;
    };
    // sf() keeps precision for large |t| where 1 - cdf underflows.
    let p = 2.0 * dist.sf(t.abs());
    p.max(0.0).min(1.0)
}

/// Inverse CDF of the Student-t distribution with `df` degrees of freedom.
pub fn students_t_ppf(p: f64, df: f64) -> f64 {
    if p.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    let Ok(dist) = StudentsT::new(0.0, 1.0, df) else {
        return f64::NAN;
    };
    // Polish the library quantile with Newton steps on the CDF.
    let mut x = dist.inverse_cdf(p);
    for _ in 0..4 {
        let density = dist.pdf(x);
        if !x.is_finite() || !(density > 0.0) {
            break;
        }
        let step = (dist.cdf(x) - p) / density;
        x -= step;
        if step.abs() <= 1e-14 * x.abs().max(1.0) {
            break;
        }
    }
    x
}

/// Inverse CDF of the standard normal; `normal_ppf(0.025) ~ -1.96`.
pub fn normal_ppf(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Equal-variance two-sample Student t-test of `a` against `b`.
///
/// Non-finite observations are omitted. Returns `(t, p)` with the statistic
/// positive when `a` has the larger mean.
pub fn student_two_sample(a: &[f64], b: &[f64]) -> (f64, f64) {
    let a: Vec<f64> = a.iter().copied().filter(|v| v.is_finite()).collect();
    let b: Vec<f64> = b.iter().copied().filter(|v| v.is_finite()).collect();
    let (na, nb) = (a.len(), b.len());
    if na + nb <= 2 || na == 0 || nb == 0 {
        return (f64::NAN, f64::NAN);
    }
    let se = pooled_stddev(na, sample_variance(&a), nb, sample_variance(&b), true);
    let t = (mean(&a) - mean(&b)) / se;
    let df = (na + nb - 2) as f64;
    (t, students_t_two_sided_p(t, df))
}
