use crate::error::{StatsError, StatsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Significance level used by every comparator.
pub const ALPHA: f64 = 0.05;

pub const DEFAULT_SPIKE_STD_THRESHOLD: f64 = 2.0;

/// Multiple-testing procedures for jointly correcting per-series p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorrectionMethod {
    #[serde(rename = "bonferroni")]
    Bonferroni,
    #[serde(rename = "sidak")]
    Sidak,
    #[serde(rename = "holm")]
    Holm,
    #[serde(rename = "holm-sidak")]
    HolmSidak,
    #[serde(rename = "simes-hochberg")]
    SimesHochberg,
    /// Benjamini-Hochberg false discovery rate.
    #[default]
    #[serde(rename = "fdr_bh")]
    FdrBh,
    /// Benjamini-Yekutieli false discovery rate.
    #[serde(rename = "fdr_by")]
    FdrBy,
}

impl CorrectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionMethod::Bonferroni => "bonferroni",
            CorrectionMethod::Sidak => "sidak",
            CorrectionMethod::Holm => "holm",
            CorrectionMethod::HolmSidak => "holm-sidak",
            CorrectionMethod::SimesHochberg => "simes-hochberg",
            CorrectionMethod::FdrBh => "fdr_bh",
            CorrectionMethod::FdrBy => "fdr_by",
        }
    }
}

impl fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrectionMethod {
    type Err = StatsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bonferroni" | "b" => Ok(Self::Bonferroni),
            "sidak" | "s" => Ok(Self::Sidak),
            "holm" | "h" => Ok(Self::Holm),
            "holm-sidak" | "hs" => Ok(Self::HolmSidak),
            "simes-hochberg" | "sh" => Ok(Self::SimesHochberg),
            "fdr_bh" | "fdr_i" | "fdr_p" | "fdri" | "fdrp" => Ok(Self::FdrBh),
            "fdr_by" | "fdr_n" | "fdr_c" | "fdrn" | "fdrcorr" => Ok(Self::FdrBy),
            other => Err(StatsError::InvalidConfig(format!(
                "unknown correction method '{other}'"
            ))),
        }
    }
}

/// Options for an [`crate::comparator::IntervalComparator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparatorConfig {
    #[serde(default)]
    pub method: CorrectionMethod,
    /// Pass multivariate p-values through uncorrected. Used when a long
    /// univariate series was split into a synthetic multivariate one.
    #[serde(default)]
    pub skip_rescaling: bool,
    /// Scale the pooled standard deviation by `sqrt(1/n1 + 1/n2)`.
    #[serde(default)]
    pub use_corrected_scores: bool,
    /// Scores are forced to zero where `|percent_change|` is below this.
    #[serde(default)]
    pub min_perc_change: f64,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            method: CorrectionMethod::default(),
            skip_rescaling: false,
            use_corrected_scores: false,
            min_perc_change: 0.0,
        }
    }
}

impl ComparatorConfig {
    pub fn from_json(raw: &str) -> StatsResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| StatsError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StatsResult<()> {
        if !self.min_perc_change.is_finite() || self.min_perc_change < 0.0 {
            return Err(StatsError::InvalidConfig(format!(
                "min_perc_change must be a non-negative number, got {}",
                self.min_perc_change
            )));
        }
        Ok(())
    }
}

/// Options for a [`crate::interval::WindowedInterval`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalConfig {
    #[serde(default = "default_spike_std_threshold")]
    pub spike_std_threshold: f64,
}

fn default_spike_std_threshold() -> f64 {
    DEFAULT_SPIKE_STD_THRESHOLD
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            spike_std_threshold: default_spike_std_threshold(),
        }
    }
}

impl IntervalConfig {
    pub fn from_json(raw: &str) -> StatsResult<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| StatsError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StatsResult<()> {
        validate_spike_threshold(self.spike_std_threshold)
    }
}

pub(crate) fn validate_spike_threshold(threshold: f64) -> StatsResult<()> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(StatsError::InvalidConfig(format!(
            "spike_std_threshold must be a positive number, got {threshold}"
        )));
    }
    Ok(())
}
