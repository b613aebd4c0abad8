//! Spearman rank correlation with a Student-t significance test.

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::ranks::average_ranks;
use crate::error::{AnalysisError, Result};

/// Point estimate and two-sided p-value of a rank correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpearmanResult {
    /// Spearman's rho in [-1, 1].
    pub rho: f64,
    /// Two-sided p-value for H0: rho = 0.
    pub p_value: f64,
    /// Number of pairs used.
    pub n: usize,
}

/// Pearson correlation of two equal-length slices.
///
/// Returns `None` when either slice has zero variance (or fewer than two
/// elements), in which case the correlation is undefined.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    if n < 2 {
        return None;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Spearman's rho without a p-value; `None` if either coordinate is constant.
///
/// This is the statistic evaluated on every bootstrap draw.
pub fn rank_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Spearman's rho and its two-sided p-value.
///
/// The p-value uses the t approximation with `n - 2` degrees of freedom,
/// `t = rho * sqrt((n - 2) / (1 - rho^2))`. Perfect rank agreement gives a
/// p-value of zero.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<SpearmanResult> {
    let n = x.len().min(y.len());
    if n < 3 {
        return Err(AnalysisError::InsufficientData {
            required: 3,
            available: n,
        });
    }
    let (x, y) = (&x[..n], &y[..n]);

    let rank_x = average_ranks(x);
    let rank_y = average_ranks(y);
    if is_constant(&rank_x) {
        return Err(AnalysisError::DegenerateSample { coordinate: "x" });
    }
    if is_constant(&rank_y) {
        return Err(AnalysisError::DegenerateSample { coordinate: "y" });
    }

    let rho = pearson(&rank_x, &rank_y).ok_or(AnalysisError::DegenerateSample { coordinate: "x" })?;

    Ok(SpearmanResult {
        rho,
        p_value: two_sided_p_value(rho, n),
        n,
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn two_sided_p_value(rho: f64, n: usize) -> f64 {
    let df = (n - 2) as f64;
    let denom = (1.0 + rho) * (1.0 - rho);
    // |rho| within rounding of 1: t diverges.
    if denom <= 1e-12 {
        return 0.0;
    }
    let t = rho * (df / denom).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_concordance() {
        let result = spearman(&[10.0, 15.0, 55.0, 72.0], &[3.0, 5.0, 20.0, 25.0]).unwrap();
        assert!((result.rho - 1.0).abs() < 1e-12);
        assert_eq!(result.p_value, 0.0);
        assert_eq!(result.n, 4);
    }

    #[test]
    fn test_perfect_discordance() {
        let result = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[50.0, 40.0, 30.0, 20.0, 10.0]).unwrap();
        assert!((result.rho + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_value_with_ties() {
        // Ranks x: [1, 2, 3, 4, 5], ranks y: [1, 2.5, 2.5, 5, 4]
        // Pearson of ranks = 8.5 / sqrt(95)
        let result = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[1.0, 3.0, 3.0, 9.0, 7.0]).unwrap();
        assert!((result.rho - 0.872_081_599_272_381).abs() < 1e-12);
        // t = 3.0867 with 3 degrees of freedom
        assert!((result.p_value - 0.053_854).abs() < 1e-4);
    }

    #[test]
    fn test_uncorrelated_has_large_p_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [3.0, 6.0, 1.0, 5.0, 2.0, 4.0];
        let result = spearman(&x, &y).unwrap();
        assert!(result.rho.abs() < 0.3);
        assert!(result.p_value > 0.5);
    }

    #[test]
    fn test_constant_coordinate_is_degenerate() {
        let err = spearman(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).unwrap_err();
        assert_eq!(err, AnalysisError::DegenerateSample { coordinate: "y" });
        assert_eq!(rank_correlation(&[2.0, 2.0], &[1.0, 3.0]), None);
    }

    #[test]
    fn test_too_few_pairs() {
        assert!(matches!(
            spearman(&[1.0, 2.0], &[2.0, 1.0]),
            Err(AnalysisError::InsufficientData { required: 3, available: 2 })
        ));
    }
}
