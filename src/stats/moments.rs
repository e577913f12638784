/// Arithmetic mean; 0 for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / (values.len() as f64)
}

/// Unbiased (n - 1) sample variance; 0 when fewer than two points exist.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    ss / ((values.len() - 1) as f64)
}

/// Unbiased sample covariance of two equally long samples.
///
/// NaN when the samples differ in length or hold fewer than two points.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);
    let cross: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    cross / ((x.len() - 1) as f64)
}

/// Pooled standard deviation of two samples for the equal-variance t-test.
///
/// Returns 0 when either sample is empty or both are single points, since
/// the pooled estimate has `n1 + n2 - 2` degrees of freedom. With `corrected`
/// the result is the standard error of the mean difference,
/// `s_p * sqrt(1/n1 + 1/n2)`.
pub fn pooled_stddev(n1: usize, var1: f64, n2: usize, var2: f64, corrected: bool) -> f64 {
    if n1 == 0 || n2 == 0 || (n1 == 1 && n2 == 1) {
        return 0.0;
    }
    let (f1, f2) = (n1 as f64, n2 as f64);
    let s_p = (((f1 - 1.0) * var1 + (f2 - 1.0) * var2) / (f1 + f2 - 2.0)).sqrt();
    if !corrected {
        return s_p;
    }
    s_p * ((1.0 / f1) + (1.0 / f2)).sqrt()
}
