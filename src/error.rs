use chrono::{DateTime, Utc};
use thiserror::Error;

/// Precondition violations surfaced by intervals, comparators and responses.
///
/// Degenerate statistics (empty windows, single points, zero variance) are not
/// errors; those produce numeric sentinels instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Spike detection needs a bound table.
    #[error("interval [{start}, {end}) has no data bound; bind a series first")]
    Unbound {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("expected {expected} series value(s), got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("column mismatch: expected [{}], got [{}]", .expected.join(", "), .actual.join(", "))]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("column '{column}' has {actual} values but the time column has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("a multivariate series needs at least one named column")]
    EmptyColumns,
    /// Optional response components must be present on both sides or neither.
    #[error(
        "the {component} in one of the responses is absent while the other is not; \
         either both should be absent or neither"
    )]
    ComponentMismatch { component: &'static str },
    #[error("response component {component} is not aligned with the scores series")]
    MisalignedComponent { component: &'static str },
    #[error("timestamps must be strictly increasing: {next} follows {previous}")]
    NonMonotonicTime {
        previous: DateTime<Utc>,
        next: DateTime<Utc>,
    },
    #[error("interval end {end} is before start {start}")]
    InvalidBounds {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type StatsResult<T> = Result<T, StatsError>;
