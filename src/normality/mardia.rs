//! Mardia's multivariate skewness and kurtosis tests.
//!
//! With centered observations `Xc` and the pseudo-inverse `S⁻¹` of the
//! unbiased covariance:
//!
//! ```text
//! b1p = (1/n²) Σᵢ Σⱼ dᵢⱼ³,   dᵢⱼ = (Xcᵢ - Xcⱼ) S⁻¹ (Xcᵢ - Xcⱼ)ᵀ
//! χ²  = n·b1p / 6,           df = p(p+1)(p+2)/6
//! b2p = (1/n) Σᵢ (Xcᵢ S⁻¹ Xcᵢᵀ)²
//! z   = (b2p - p(p+2)) / sqrt(8p(p+2)/n)
//! ```
//!
//! The pairwise-distance kernel `dᵢⱼ` is strictly positive, so `b1p` grows
//! with the spread of the sample and the skewness test rejects for any
//! sizeable sample, normal or not. [`SkewnessForm::CrossProduct`] swaps in
//! Mardia's textbook kernel `Xcᵢ S⁻¹ Xcⱼᵀ`, which is calibrated under
//! normality.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::statistics::{center, covariance, mahalanobis_sq, pseudo_inverse, Normalization};
use crate::types::Matrix2x2;

const P: f64 = 2.0;

/// Pair kernel used in the skewness double sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkewnessForm {
    /// Squared Mahalanobis distance between the pair.
    #[default]
    PairwiseDistance,
    /// Mardia's cross-product `Xcᵢ S⁻¹ Xcⱼᵀ`.
    CrossProduct,
}

/// Mardia statistics for a bivariate sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MardiaResult {
    /// Multivariate skewness `b1p`.
    pub b1p: f64,
    /// Skewness chi-squared statistic `n·b1p/6`.
    pub skew_chi2: f64,
    /// Degrees of freedom of the skewness statistic.
    pub skew_df: f64,
    /// Upper-tail chi-squared p-value.
    pub skew_p_value: f64,
    /// Multivariate kurtosis `b2p`.
    pub b2p: f64,
    /// Kurtosis z-score.
    pub kurt_z: f64,
    /// Two-sided normal p-value.
    pub kurt_p_value: f64,
    /// Whether the covariance was rank deficient.
    pub singular_covariance: bool,
}

/// Run both Mardia tests. Callers guarantee `points.len() >= 3`.
pub fn mardia(points: &[Vector2<f64>], form: SkewnessForm) -> MardiaResult {
    let n = points.len();
    let centered = center(points);
    let s = covariance(points, Normalization::Sample);
    let pinv = pseudo_inverse(&s);

    let b1p = skewness_sum(&centered, &pinv.inverse, form) / (n * n) as f64;
    let skew_chi2 = n as f64 * b1p / 6.0;
    let skew_df = P * (P + 1.0) * (P + 2.0) / 6.0;
    let skew_p_value = ChiSquared::new(skew_df)
        .map(|d| d.sf(skew_chi2))
        .unwrap_or(f64::NAN);

    let b2p = centered
        .iter()
        .map(|v| mahalanobis_sq(v, &pinv.inverse).powi(2))
        .sum::<f64>()
        / n as f64;
    let expected = P * (P + 2.0);
    let variance = 8.0 * P * (P + 2.0) / n as f64;
    let kurt_z = (b2p - expected) / variance.sqrt();
    let kurt_p_value = Normal::new(0.0, 1.0)
        .map(|d| 2.0 * d.sf(kurt_z.abs()))
        .unwrap_or(f64::NAN);

    MardiaResult {
        b1p,
        skew_chi2,
        skew_df,
        skew_p_value,
        b2p,
        kurt_z,
        kurt_p_value,
        singular_covariance: pinv.is_singular(),
    }
}

/// Cubed pair kernel summed over all ordered pairs.
///
/// Rows are reduced independently and then summed in index order, so the
/// parallel and sequential paths add in the same order.
fn skewness_sum(centered: &[Vector2<f64>], s_inv: &Matrix2x2, form: SkewnessForm) -> f64 {
    let row_sum = |xi: &Vector2<f64>| -> f64 {
        let projected = s_inv * xi;
        centered
            .iter()
            .map(|xj| {
                let g = match form {
                    SkewnessForm::CrossProduct => projected.dot(xj),
                    SkewnessForm::PairwiseDistance => mahalanobis_sq(&(xi - xj), s_inv),
                };
                g.powi(3)
            })
            .sum()
    };

    crate::thread_pool::install(|| {
        #[cfg(feature = "parallel")]
        let rows: Vec<f64> = centered.par_iter().map(row_sum).collect();
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<f64> = centered.iter().map(row_sum).collect();
        rows.iter().sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pairs: &[(f64, f64)]) -> Vec<Vector2<f64>> {
        pairs.iter().map(|&(a, b)| Vector2::new(a, b)).collect()
    }

    #[test]
    fn test_symmetric_sample_has_zero_skewness() {
        // Point-symmetric about the origin: every odd moment vanishes.
        let pts = sample(&[(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)]);
        let res = mardia(&pts, SkewnessForm::CrossProduct);
        assert!(res.b1p.abs() < 1e-12);
        assert!((res.skew_p_value - 1.0).abs() < 1e-12);
        assert!((res.skew_df - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_pairwise_distance_on_known_sample() {
        // S⁻¹ = 1.5·I. Opposite pairs: d = 6, adjacent pairs: d = 3.
        // Row sum = 216 + 2·27 = 270, b1p = 4·270 / 16 = 67.5, χ² = 45.
        let pts = sample(&[(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)]);
        let res = mardia(&pts, SkewnessForm::PairwiseDistance);
        assert!((res.b1p - 67.5).abs() < 1e-9);
        assert!((res.skew_chi2 - 45.0).abs() < 1e-9);
        assert!(res.skew_p_value < 1e-6);
    }

    #[test]
    fn test_kurtosis_of_known_sample() {
        // Four points on the axes: S = diag(2/3, 2/3), each |Xc_i|² S⁻¹ = 1.5,
        // so b2p = 2.25 and z = (2.25 - 8) / sqrt(16) = -1.4375.
        let pts = sample(&[(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)]);
        let res = mardia(&pts, SkewnessForm::CrossProduct);
        assert!((res.b2p - 2.25).abs() < 1e-10);
        assert!((res.kurt_z + 1.4375).abs() < 1e-10);
        assert!(!res.singular_covariance);
    }

    #[test]
    fn test_outlier_inflates_statistics() {
        let mut pairs: Vec<(f64, f64)> = (0..30)
            .map(|i| {
                let t = i as f64;
                ((t * 0.37).sin(), (t * 0.91).cos())
            })
            .collect();
        pairs.push((40.0, 40.0));
        let res = mardia(&sample(&pairs), SkewnessForm::CrossProduct);
        assert!(res.skew_p_value < 0.05);
        assert!(res.kurt_p_value < 0.05);
    }

    #[test]
    fn test_singular_covariance_uses_pseudo_inverse() {
        let pts = sample(&[(1.0, 5.0), (2.0, 5.0), (3.0, 5.0), (4.0, 5.0)]);
        let res = mardia(&pts, SkewnessForm::PairwiseDistance);
        assert!(res.singular_covariance);
        assert!(res.b1p.is_finite());
        assert!(res.b2p.is_finite());
    }
}
