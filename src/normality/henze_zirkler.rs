//! Henze–Zirkler test based on the empirical characteristic function.
//!
//! Uses the maximum-likelihood covariance `S` (divide by `n`) and its
//! pseudo-inverse. With `Dⱼ` the squared Mahalanobis norm of each centered
//! observation and `Dⱼₖ` the squared Mahalanobis distance between pairs:
//!
//! ```text
//! β  = (1/√2) · ((2p + 1)/4)^(1/(p+4)) · n^(1/(p+4))
//! HZ = n · [ (1/n²) Σⱼ Σₖ exp(-β²/2 · Dⱼₖ)
//!          - 2(1 + β²)^(-p/2) · (1/n) Σⱼ exp(-β²/(2(1 + β²)) · Dⱼ)
//!          + (1 + 2β²)^(-p/2) ]
//! ```
//!
//! A rank-deficient covariance yields `HZ = 4n`. The p-value is the upper
//! tail of a log-normal with moments matched to the null distribution.

use nalgebra::Vector2;
use statrs::distribution::{ContinuousCDF, LogNormal};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::statistics::{center, covariance, mahalanobis_sq, pseudo_inverse, Normalization};
use crate::types::Matrix2x2;

const P: f64 = 2.0;

/// Henze–Zirkler statistic for a bivariate sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HenzeZirklerResult {
    /// Test statistic.
    pub statistic: f64,
    /// Upper-tail log-normal p-value.
    pub p_value: f64,
    /// Smoothing parameter.
    pub beta: f64,
    /// Whether the covariance was rank deficient.
    pub singular_covariance: bool,
}

/// Smoothing parameter `β` for sample size `n`.
pub fn smoothing_beta(n: usize) -> f64 {
    let exponent = 1.0 / (P + 4.0);
    std::f64::consts::FRAC_1_SQRT_2 * ((2.0 * P + 1.0) / 4.0).powf(exponent) * (n as f64).powf(exponent)
}

/// Run the test. Callers guarantee `points.len() >= 3`.
pub fn henze_zirkler(points: &[Vector2<f64>]) -> HenzeZirklerResult {
    let n = points.len();
    let nf = n as f64;
    let centered = center(points);
    let pinv = pseudo_inverse(&covariance(points, Normalization::Population));
    let beta = smoothing_beta(n);
    let b2 = beta * beta;

    let statistic = if pinv.is_singular() {
        4.0 * nf
    } else {
        let pair_term = pair_kernel_sum(&centered, &pinv.inverse, b2) / (nf * nf);
        let marginal = centered
            .iter()
            .map(|v| (-(b2 / (2.0 * (1.0 + b2))) * mahalanobis_sq(v, &pinv.inverse)).exp())
            .sum::<f64>()
            / nf;
        nf * (pair_term - 2.0 * (1.0 + b2).powf(-P / 2.0) * marginal
            + (1.0 + 2.0 * b2).powf(-P / 2.0))
    };

    HenzeZirklerResult {
        statistic,
        p_value: null_tail(statistic, beta),
        beta,
        singular_covariance: pinv.is_singular(),
    }
}

/// `Σⱼ Σₖ exp(-β²/2 · Dⱼₖ)`, reduced per row then in index order.
fn pair_kernel_sum(centered: &[Vector2<f64>], s_inv: &Matrix2x2, b2: f64) -> f64 {
    let row_sum = |xj: &Vector2<f64>| -> f64 {
        centered
            .iter()
            .map(|xk| (-b2 / 2.0 * mahalanobis_sq(&(xj - xk), s_inv)).exp())
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

/// Log-normal upper tail with the null mean and variance of HZ.
fn null_tail(statistic: f64, beta: f64) -> f64 {
    let b2 = beta * beta;
    let b4 = b2 * b2;
    let b8 = b4 * b4;
    let a = 1.0 + 2.0 * b2;
    let wb = (1.0 + b2) * (1.0 + 3.0 * b2);

    let mu = 1.0 - a.powf(-P / 2.0) * (1.0 + P * b2 / a + P * (P + 2.0) * b4 / (2.0 * a * a));
    let si2 = 2.0 * (1.0 + 4.0 * b2).powf(-P / 2.0)
        + 2.0 * a.powf(-P) * (1.0 + 2.0 * P * b4 / (a * a) + 3.0 * P * (P + 2.0) * b8 / (4.0 * a.powi(4)))
        - 4.0 * wb.powf(-P / 2.0)
            * (1.0 + 3.0 * P * b4 / (2.0 * wb) + P * (P + 2.0) * b8 / (2.0 * wb * wb));

    let location = (mu.powi(4) / (si2 + mu * mu)).sqrt().ln();
    let scale = (si2 / (mu * mu)).ln_1p().sqrt();

    LogNormal::new(location, scale)
        .map(|d| d.sf(statistic))
        .unwrap_or(f64::NAN)
}
