//! Result records produced by the analysis pipelines.
//!
//! Every record is an immutable, serializable value consumed by the
//! reporting layer (terminal, JSON, CSV).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normality::SkewnessForm;
use crate::types::{AnalysisPeriod, Granularity};

/// Conventional significance marker for a p-value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Significance {
    /// p < 0.001
    #[serde(rename = "***")]
    VeryHigh,
    /// p < 0.01
    #[serde(rename = "**")]
    High,
    /// p < 0.05
    #[serde(rename = "*")]
    Moderate,
    /// Not significant.
    #[serde(rename = "ns")]
    NotSignificant,
}

impl Significance {
    /// Classify a p-value.
    pub fn from_p_value(p: f64) -> Self {
        if p < 0.001 {
            Significance::VeryHigh
        } else if p < 0.01 {
            Significance::High
        } else if p < 0.05 {
            Significance::Moderate
        } else {
            Significance::NotSignificant
        }
    }

    /// Marker text (`***`, `**`, `*`, `ns`).
    pub fn marker(self) -> &'static str {
        match self {
            Significance::VeryHigh => "***",
            Significance::High => "**",
            Significance::Moderate => "*",
            Significance::NotSignificant => "ns",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Rank correlation of the activity index with one bin's event counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Bin label.
    pub label: String,
    /// Inclusive lower speed bound in km/s.
    pub vmin: f64,
    /// Exclusive upper speed bound in km/s.
    pub vmax: f64,
    /// Spearman's rho.
    pub rho: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Lower bound of the 95% percentile bootstrap interval.
    pub ci_low: f64,
    /// Upper bound of the 95% percentile bootstrap interval.
    pub ci_high: f64,
    /// Aligned periods used for the estimate.
    pub n_periods: usize,
    /// All events in the bin, including periods that did not align.
    pub n_events: usize,
    /// Significance marker for `p_value`.
    pub significance: Significance,
    /// Bootstrap draws excluded for zero variance.
    pub degenerate_draws: usize,
}

impl CorrelationResult {
    /// Centre of the bin in km/s.
    pub fn bin_center(&self) -> f64 {
        0.5 * (self.vmin + self.vmax)
    }

    /// Whether the bootstrap interval contains the point estimate.
    pub fn ci_contains_estimate(&self) -> bool {
        self.ci_low <= self.rho && self.rho <= self.ci_high
    }
}

/// A bin that produced no correlation, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedBin {
    /// Bin label.
    pub label: String,
    /// Aligned periods available.
    pub n_periods: usize,
    /// Human-readable reason.
    pub reason: String,
}

/// Correlations for every bin of a scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Join granularity.
    pub granularity: Granularity,
    /// Period restriction, if any.
    pub period: Option<AnalysisPeriod>,
    /// Bootstrap iterations per bin.
    pub bootstrap_iterations: usize,
    /// Minimum aligned periods required per bin.
    pub min_sample_size: usize,
    /// Bins with a correlation, in scheme order.
    pub results: Vec<CorrelationResult>,
    /// Bins skipped for insufficient data, in scheme order.
    pub skipped: Vec<SkippedBin>,
}

impl CorrelationReport {
    /// Result for a label.
    pub fn get(&self, label: &str) -> Option<&CorrelationResult> {
        self.results.iter().find(|r| r.label == label)
    }
}

/// Outcome of one normality sub-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityVerdict {
    /// Test name.
    pub test: String,
    /// Test statistic (HZ, chi-squared, or z-score).
    pub statistic: f64,
    /// p-value.
    pub p_value: f64,
    /// Whether normality is rejected at the configured level.
    pub rejected: bool,
}

impl NormalityVerdict {
    /// Build a verdict, rejecting when `p_value < alpha`.
    pub fn new(test: impl Into<String>, statistic: f64, p_value: f64, alpha: f64) -> Self {
        Self {
            test: test.into(),
            statistic,
            p_value,
            rejected: p_value < alpha,
        }
    }
}

/// Henze–Zirkler and Mardia results with the combined decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityReport {
    /// Henze–Zirkler test.
    pub henze_zirkler: NormalityVerdict,
    /// Mardia skewness (chi-squared statistic).
    pub mardia_skew: NormalityVerdict,
    /// Mardia kurtosis (z statistic).
    pub mardia_kurt: NormalityVerdict,
    /// True if any sub-test rejects.
    pub overall_rejected: bool,
    /// Observations used.
    pub n_observations: usize,
    /// Significance level applied to each sub-test.
    pub alpha: f64,
    /// Whether the sample covariance was singular (pseudo-inverse used).
    pub singular_covariance: bool,
    /// Pair kernel used for Mardia skewness.
    pub skewness_form: SkewnessForm,
}

impl NormalityReport {
    /// The three verdicts in reporting order.
    pub fn verdicts(&self) -> [&NormalityVerdict; 3] {
        [&self.henze_zirkler, &self.mardia_skew, &self.mardia_kurt]
    }

    /// Number of sub-tests that reject normality.
    pub fn rejection_count(&self) -> usize {
        self.verdicts().iter().filter(|v| v.rejected).count()
    }
}

/// Point estimates for every bin of one scheme that met the minimum size.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemeCorrelations {
    /// `(label, rho)` in scheme order.
    pub estimates: Vec<(String, f64)>,
}

impl SchemeCorrelations {
    /// Estimate for a label.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.estimates
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, rho)| *rho)
    }

    /// Append an estimate.
    pub fn push(&mut self, label: impl Into<String>, rho: f64) {
        self.estimates.push((label.into(), rho));
    }

    /// Whether no bin produced an estimate.
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

/// Baseline-anchored deviation for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySummary {
    /// Bin label.
    pub label: String,
    /// Baseline rho.
    pub baseline_rho: f64,
    /// Mean of `|rho_variant - rho_baseline| / |rho_baseline| * 100`.
    pub mean_percent_deviation: f64,
    /// Variants that contained the label.
    pub variants_compared: usize,
}

/// Range spread across all schemes for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadSummary {
    /// Bin label.
    pub label: String,
    /// Mean rho across schemes containing the label.
    pub mean_rho: f64,
    /// Smallest rho.
    pub min_rho: f64,
    /// Largest rho.
    pub max_rho: f64,
    /// `(max - min) / |mean| * 100`.
    pub percent_range: f64,
    /// Schemes (baseline included) that contained the label.
    pub schemes_compared: usize,
}

/// Robustness class for a percentage variation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Robustness {
    /// Below 5%.
    HighlyRobust,
    /// 5% to 10%.
    Robust,
    /// 10% and above.
    Sensitive,
}

impl Robustness {
    /// Classify a percentage variation.
    pub fn from_percent(percent: f64) -> Self {
        if percent < 5.0 {
            Robustness::HighlyRobust
        } else if percent < 10.0 {
            Robustness::Robust
        } else {
            Robustness::Sensitive
        }
    }
}

/// Correlations per scheme with both spread summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    /// Join granularity.
    pub granularity: Granularity,
    /// Baseline scheme estimates.
    pub baseline: SchemeCorrelations,
    /// Estimates per named variant, in input order. Failed variants are absent.
    pub variants: Vec<(String, SchemeCorrelations)>,
    /// Baseline-anchored mean percentage deviation per label.
    pub deviation: Vec<SensitivitySummary>,
    /// Max-min over mean spread per label.
    pub spread: Vec<SpreadSummary>,
}
