use chrono::{DateTime, Utc};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Calendar day label used for interval and spike reporting.
pub fn day_label(ts: DateTime<Utc>) -> String {
    ts.format(DAY_FORMAT).to_string()
}

/// Returns `true` when `ts` lies in the half-open range `[start, end)`.
pub fn in_half_open(ts: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start <= ts && ts < end
}
