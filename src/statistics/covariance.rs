//! Sample covariance and pseudo-inverse for the bivariate sample.
//!
//! The normality tests need `S⁻¹` even when the sample covariance is
//! singular (e.g. a constant coordinate), so the inverse is always the
//! Moore–Penrose pseudo-inverse computed from the SVD.

use nalgebra::Vector2;

use crate::types::Matrix2x2;

/// Relative cutoff for small singular values, scaled by the largest one.
///
/// Matches the usual `rcond = eps * max(rows, cols)` convention.
const PINV_RCOND: f64 = 1e-15 * 2.0;

/// Normalization used for the covariance estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Divide by `n` (maximum likelihood).
    Population,
    /// Divide by `n - 1` (unbiased).
    Sample,
}

/// Column means of the paired sample.
pub fn column_means(points: &[Vector2<f64>]) -> Vector2<f64> {
    if points.is_empty() {
        return Vector2::zeros();
    }
    let sum = points.iter().fold(Vector2::zeros(), |acc, p| acc + p);
    sum / points.len() as f64
}

/// Subtract the column means from every observation.
pub fn center(points: &[Vector2<f64>]) -> Vec<Vector2<f64>> {
    let mean = column_means(points);
    points.iter().map(|p| p - mean).collect()
}

/// 2x2 covariance of the sample.
///
/// Returns the zero matrix when there are too few observations for the
/// requested normalization.
pub fn covariance(points: &[Vector2<f64>], norm: Normalization) -> Matrix2x2 {
    let n = points.len();
    let denom = match norm {
        Normalization::Population => n,
        Normalization::Sample => n.saturating_sub(1),
    };
    if denom == 0 {
        return Matrix2x2::zeros();
    }

    let mean = column_means(points);
    let m2 = points.iter().fold(Matrix2x2::zeros(), |acc, p| {
        let d = p - mean;
        acc + d * d.transpose()
    });
    m2 / denom as f64
}

/// Pseudo-inverse of a covariance matrix with its numerical rank.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoInverse {
    /// Moore–Penrose pseudo-inverse.
    pub inverse: Matrix2x2,
    /// Number of singular values above the cutoff.
    pub rank: usize,
}

impl PseudoInverse {
    /// Whether the original matrix was rank deficient.
    pub fn is_singular(&self) -> bool {
        self.rank < 2
    }
}

/// Moore–Penrose pseudo-inverse via SVD.
pub fn pseudo_inverse(matrix: &Matrix2x2) -> PseudoInverse {
    let svd = matrix.svd(true, true);
    let max_sv = svd.singular_values.max();
    let cutoff = PINV_RCOND * max_sv;
    let rank = svd
        .singular_values
        .iter()
        .filter(|&&s| s > cutoff)
        .count();

    let inverse = svd
        .pseudo_inverse(cutoff.max(0.0))
        .unwrap_or_else(|_| Matrix2x2::zeros());

    PseudoInverse { inverse, rank }
}

/// Squared Mahalanobis norm `vᵀ S⁻¹ v`.
#[inline]
pub fn mahalanobis_sq(v: &Vector2<f64>, s_inv: &Matrix2x2) -> f64 {
    v.dot(&(s_inv * v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(1.0, 2.0),
            Vector2::new(2.0, 1.0),
            Vector2::new(3.0, 5.0),
            Vector2::new(4.0, 4.0),
        ]
    }

    #[test]
    fn test_sample_vs_population_covariance() {
        let s = covariance(&sample(), Normalization::Sample);
        let p = covariance(&sample(), Normalization::Population);
        // var(x) = 5/3 (n-1) and 5/4 (n)
        assert!((s[(0, 0)] - 5.0 / 3.0).abs() < 1e-12);
        assert!((p[(0, 0)] - 1.25).abs() < 1e-12);
        assert!((s[(0, 1)] - s[(1, 0)]).abs() < 1e-12);
    }

    #[test]
    fn test_pseudo_inverse_of_full_rank_is_inverse() {
        let s = covariance(&sample(), Normalization::Sample);
        let pinv = pseudo_inverse(&s);
        assert_eq!(pinv.rank, 2);
        assert!(!pinv.is_singular());
        let identity = s * pinv.inverse;
        assert!((identity - Matrix2x2::identity()).abs().max() < 1e-10);
    }

    #[test]
    fn test_pseudo_inverse_of_singular_matrix() {
        // Second coordinate constant: covariance is rank one.
        let points: Vec<Vector2<f64>> = (0..5).map(|i| Vector2::new(i as f64, 3.0)).collect();
        let s = covariance(&points, Normalization::Sample);
        let pinv = pseudo_inverse(&s);
        assert_eq!(pinv.rank, 1);
        assert!(pinv.is_singular());
        // pinv(diag(a, 0)) = diag(1/a, 0)
        assert!((pinv.inverse[(0, 0)] - 1.0 / s[(0, 0)]).abs() < 1e-10);
        assert!(pinv.inverse[(1, 1)].abs() < 1e-12);
    }

    #[test]
    fn test_zero_matrix_pseudo_inverse() {
        let pinv = pseudo_inverse(&Matrix2x2::zeros());
        assert_eq!(pinv.rank, 0);
        assert_eq!(pinv.inverse, Matrix2x2::zeros());
    }

    #[test]
    fn test_mahalanobis_identity() {
        let v = Vector2::new(3.0, 4.0);
        assert!((mahalanobis_sq(&v, &Matrix2x2::identity()) - 25.0).abs() < 1e-12);
    }
}
