//! Rank correlation estimator with a percentile bootstrap interval.

use tracing::debug;

use crate::align::AlignedSeries;
use crate::error::{AnalysisError, Result};
use crate::statistics::{bootstrap_rank_correlation, spearman};

/// Coverage of the reported bootstrap interval.
pub const CI_LEVEL: f64 = 0.95;

/// Point estimate, p-value and bootstrap interval for one aligned sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationEstimate {
    /// Spearman's rho.
    pub rho: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// 2.5th percentile of the bootstrap distribution.
    pub ci_low: f64,
    /// 97.5th percentile of the bootstrap distribution.
    pub ci_high: f64,
    /// Paired observations used.
    pub n: usize,
    /// Bootstrap draws excluded for zero variance.
    pub degenerate_draws: usize,
}

/// Estimate Spearman's rho with a 95% percentile bootstrap interval.
///
/// The size threshold is checked before any statistic is computed.
///
/// # Errors
///
/// - `InsufficientData` if `aligned.len() < min_sample_size`, or if fewer
///   than two bootstrap draws were non-degenerate.
/// - `DegenerateSample` if either coordinate is constant.
pub fn estimate(
    aligned: &AlignedSeries,
    bootstrap_iterations: usize,
    min_sample_size: usize,
    seed: u64,
) -> Result<CorrelationEstimate> {
    let n = aligned.len();
    if n < min_sample_size {
        return Err(AnalysisError::InsufficientData {
            required: min_sample_size,
            available: n,
        });
    }

    let point = spearman(aligned.x(), aligned.y())?;
    let distribution = bootstrap_rank_correlation(aligned.x(), aligned.y(), bootstrap_iterations, seed);
    let (ci_low, ci_high) = distribution.percentile_ci(CI_LEVEL)?;

    debug!(
        n,
        rho = point.rho,
        p_value = point.p_value,
        ci_low,
        ci_high,
        degenerate = distribution.degenerate,
        "rank correlation estimated"
    );

    Ok(CorrelationEstimate {
        rho: point.rho,
        p_value: point.p_value,
        ci_low,
        ci_high,
        n,
        degenerate_draws: distribution.degenerate,
    })
}

/// Spearman point estimate only, with a size threshold.
///
/// Used by sensitivity runs, which compare estimates across schemes and do
/// not need intervals.
pub fn point_estimate(aligned: &AlignedSeries, min_sample_size: usize) -> Result<f64> {
    if aligned.len() < min_sample_size {
        return Err(AnalysisError::InsufficientData {
            required: min_sample_size,
            available: aligned.len(),
        });
    }
    spearman(aligned.x(), aligned.y()).map(|r| r.rho)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CalendarKey;

    fn aligned(x: &[f64], y: &[f64]) -> AlignedSeries {
        let keys = (0..x.len() as i32).map(|i| CalendarKey::Year(2000 + i)).collect();
        AlignedSeries::from_parts(keys, x.to_vec(), y.to_vec()).unwrap()
    }

    #[test]
    fn test_size_threshold_checked_first() {
        // Constant y would be degenerate, but the size check fires first.
        let sample = aligned(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]);
        let err = estimate(&sample, 1000, 5, 0).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                required: 5,
                available: 3
            }
        );
    }

    #[test]
    fn test_interval_brackets_estimate_for_strong_association() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| v * 2.0 + if i % 3 == 0 { 5.0 } else { 0.0 })
            .collect();
        let est = estimate(&aligned(&x, &y), 500, 5, 11).unwrap();
        assert!(est.rho > 0.9);
        assert!(est.ci_low <= est.rho + 1e-12);
        assert!(est.ci_high >= est.rho - 1e-12);
        assert!(est.ci_high <= 1.0);
        assert!(est.p_value < 0.001);
    }

    #[test]
    fn test_point_estimate_threshold() {
        let sample = aligned(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]);
        assert!(point_estimate(&sample, 3).is_ok());
        assert!(point_estimate(&sample, 4).is_err());
    }
}
