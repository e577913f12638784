use crate::series::TimeSeries;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Midnight UTC, `offset` days after 2026-01-01.
pub fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("base day")
        + Duration::days(offset)
}

pub fn days(start: i64, count: usize) -> Vec<DateTime<Utc>> {
    (0..count as i64).map(|i| day(start + i)).collect()
}

/// Univariate daily series starting `start` days after the base day.
pub fn daily_series(start: i64, values: &[f64]) -> TimeSeries {
    TimeSeries::univariate(days(start, values.len()), values.to_vec()).expect("series")
}

/// Multivariate daily series; every column must have the same length.
pub fn daily_multi(start: i64, columns: Vec<(&str, Vec<f64>)>) -> TimeSeries {
    let len = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
    TimeSeries::multivariate(
        days(start, len),
        columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), values))
            .collect(),
    )
    .expect("multivariate series")
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected}, got {actual}"
    );
}
