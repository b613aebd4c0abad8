//! Configuration for correlation, normality and sensitivity runs.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::normality::SkewnessForm;
use crate::types::{AnalysisPeriod, Granularity};

/// Default number of bootstrap resamples for the confidence interval.
pub const DEFAULT_BOOTSTRAP_ITERATIONS: usize = 1_000;

/// Default significance level for the normality battery.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Default base seed for bootstrap resampling.
pub const DEFAULT_SEED: u64 = 0x5EED_C0DE;

/// Configuration options for [`CmeAnalysis`](crate::CmeAnalysis).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Join key resolution (default: annual).
    pub granularity: Granularity,

    /// Bootstrap resamples for the 95% CI (default: 1,000).
    pub bootstrap_iterations: usize,

    /// Minimum aligned periods for a correlation.
    ///
    /// `None` uses the granularity default (5 annual, 12 monthly).
    pub min_sample_size: Option<usize>,

    /// Minimum aligned periods for a sensitivity point estimate.
    ///
    /// `None` uses the granularity default (3 annual, 10 monthly).
    pub sensitivity_min_sample_size: Option<usize>,

    /// Rejection threshold for the normality sub-tests (default: 0.05).
    pub significance_level: f64,

    /// Base seed for bootstrap resampling. Fixed by default so published
    /// results are reproducible.
    pub seed: u64,

    /// Optional inclusive date range applied to both inputs.
    pub period: Option<AnalysisPeriod>,

    /// Pair kernel for the Mardia skewness statistic.
    pub mardia_skewness: SkewnessForm,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            granularity: Granularity::Year,
            bootstrap_iterations: DEFAULT_BOOTSTRAP_ITERATIONS,
            min_sample_size: None,
            sensitivity_min_sample_size: None,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            seed: DEFAULT_SEED,
            period: None,
            mardia_skewness: SkewnessForm::PairwiseDistance,
        }
    }
}

impl Config {
    /// Annual analysis defaults.
    pub fn annual() -> Self {
        Self::default()
    }

    /// Monthly analysis defaults.
    pub fn monthly() -> Self {
        Self {
            granularity: Granularity::YearMonth,
            ..Self::default()
        }
    }

    /// Resolved minimum sample size for correlations.
    pub fn min_sample_size(&self) -> usize {
        self.min_sample_size
            .unwrap_or_else(|| self.granularity.default_min_sample_size())
    }

    /// Resolved minimum sample size for sensitivity point estimates.
    pub fn sensitivity_min_sample_size(&self) -> usize {
        self.sensitivity_min_sample_size
            .unwrap_or_else(|| self.granularity.default_sensitivity_min_sample_size())
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bootstrap_iterations == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "bootstrap_iterations",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.min_sample_size == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "min_sample_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sensitivity_min_sample_size == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "sensitivity_min_sample_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "significance_level",
                reason: format!("{} is outside (0, 1)", self.significance_level),
            });
        }
        if let Some(period) = &self.period {
            if period.start > period.end {
                return Err(ConfigError::InvalidParameter {
                    name: "period",
                    reason: format!("start {} is after end {}", period.start, period.end),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_granularity_defaults() {
        assert_eq!(Config::annual().min_sample_size(), 5);
        assert_eq!(Config::monthly().min_sample_size(), 12);
        assert_eq!(Config::annual().sensitivity_min_sample_size(), 3);
        assert_eq!(Config::monthly().sensitivity_min_sample_size(), 10);
    }

    #[test]
    fn test_explicit_min_sample_overrides_default() {
        let config = Config {
            min_sample_size: Some(8),
            ..Config::monthly()
        };
        assert_eq!(config.min_sample_size(), 8);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let config = Config {
            bootstrap_iterations: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            significance_level: 1.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            period: Some(AnalysisPeriod::new(
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            )),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"granularity": "monthly", "bootstrap_iterations": 200}"#)
                .unwrap();
        assert_eq!(config.granularity, Granularity::YearMonth);
        assert_eq!(config.bootstrap_iterations, 200);
        assert_eq!(config.min_sample_size(), 12);
        assert!((config.significance_level - 0.05).abs() < 1e-12);
        assert_eq!(config.mardia_skewness, SkewnessForm::PairwiseDistance);

        let config: Config = serde_json::from_str(r#"{"mardia_skewness": "cross-product"}"#).unwrap();
        assert_eq!(config.mardia_skewness, SkewnessForm::CrossProduct);
    }
}
