//! Paired percentile bootstrap for rank correlation.
//!
//! Each resample draws `n` indices with replacement and moves both
//! coordinates of a pair together, preserving their dependence. Every draw is
//! seeded from `(base_seed, draw_index)`, so the distribution is identical
//! whether draws run sequentially or on the rayon pool.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::quantile::percentile_interval;
use super::spearman::rank_correlation;
use crate::error::{AnalysisError, Result};

/// Minimum number of non-degenerate draws needed for a percentile interval.
pub const MIN_VALID_DRAWS: usize = 2;

/// Counter-based RNG seed generation using SplitMix64.
///
/// A stateless mixer giving well-distributed, independent seeds for each
/// draw index.
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64, see https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Resample `(x, y)` pairs with replacement into preallocated buffers.
///
/// # Panics
///
/// Panics if the four slices differ in length.
pub fn paired_resample_into<R: Rng>(
    x: &[f64],
    y: &[f64],
    rng: &mut R,
    out_x: &mut [f64],
    out_y: &mut [f64],
) {
    let n = x.len();
    assert!(
        y.len() == n && out_x.len() == n && out_y.len() == n,
        "Paired buffers must have the same length as the input"
    );
    if n == 0 {
        return;
    }

    for (ox, oy) in out_x.iter_mut().zip(out_y.iter_mut()) {
        let idx = rng.random_range(0..n);
        *ox = x[idx];
        *oy = y[idx];
    }
}

/// Distribution of bootstrapped rank correlations.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapDistribution {
    /// Correlations from non-degenerate draws, in draw order.
    pub draws: Vec<f64>,
    /// Draws excluded because a resampled coordinate was constant.
    pub degenerate: usize,
}

impl BootstrapDistribution {
    /// Percentile interval at the given coverage (0.95 for a 95% CI).
    ///
    /// Fails with `InsufficientData` when fewer than two valid draws remain.
    pub fn percentile_ci(&self, level: f64) -> Result<(f64, f64)> {
        if self.draws.len() < MIN_VALID_DRAWS {
            return Err(AnalysisError::InsufficientData {
                required: MIN_VALID_DRAWS,
                available: self.draws.len(),
            });
        }
        percentile_interval(&self.draws, level).ok_or(AnalysisError::InsufficientData {
            required: MIN_VALID_DRAWS,
            available: 0,
        })
    }
}

/// Bootstrap Spearman's rho over `iterations` paired resamples.
pub fn bootstrap_rank_correlation(
    x: &[f64],
    y: &[f64],
    iterations: usize,
    seed: u64,
) -> BootstrapDistribution {
    let n = x.len().min(y.len());
    let (x, y) = (&x[..n], &y[..n]);

    #[cfg(feature = "parallel")]
    let results: Vec<Option<f64>> = crate::thread_pool::install(|| {
        (0..iterations)
            .into_par_iter()
            .map_init(
                || (vec![0.0; n], vec![0.0; n]),
                |(bx, by), i| single_draw(x, y, seed, i as u64, bx, by),
            )
            .collect()
    });

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Option<f64>> = {
        let mut bx = vec![0.0; n];
        let mut by = vec![0.0; n];
        (0..iterations)
            .map(|i| single_draw(x, y, seed, i as u64, &mut bx, &mut by))
            .collect()
    };

    let draws: Vec<f64> = results.iter().flatten().copied().collect();
    let degenerate = iterations - draws.len();
    if degenerate > 0 {
        debug!(
            iterations,
            degenerate, "excluded zero-variance bootstrap draws"
        );
    }

    BootstrapDistribution { draws, degenerate }
}

fn single_draw(
    x: &[f64],
    y: &[f64],
    seed: u64,
    counter: u64,
    buf_x: &mut [f64],
    buf_y: &mut [f64],
) -> Option<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(seed, counter));
    paired_resample_into(x, y, &mut rng, buf_x, buf_y);
    rank_correlation(buf_x, buf_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_seed_is_deterministic_and_distinct() {
        assert_eq!(counter_rng_seed(42, 7), counter_rng_seed(42, 7));
        assert_ne!(counter_rng_seed(42, 7), counter_rng_seed(42, 8));
        assert_ne!(counter_rng_seed(42, 0), 42);
    }

    #[test]
    fn test_resample_keeps_pairs_together() {
        let x: Vec<f64> = (0..50).map(|v| v as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * 10.0 + 1.0).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut bx = vec![0.0; 50];
        let mut by = vec![0.0; 50];

        paired_resample_into(&x, &y, &mut rng, &mut bx, &mut by);

        for (a, b) in bx.iter().zip(&by) {
            assert!(x.contains(a));
            assert_eq!(*b, a * 10.0 + 1.0);
        }
    }

    #[test]
    fn test_same_seed_same_distribution() {
        let x = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0, 3.0, 6.0];
        let y = [2.0, 3.0, 1.0, 9.0, 4.0, 8.0, 5.0, 6.0];
        let a = bootstrap_rank_correlation(&x, &y, 200, 99);
        let b = bootstrap_rank_correlation(&x, &y, 200, 99);
        assert_eq!(a, b);
        assert_eq!(a.draws.len() + a.degenerate, 200);
    }

    #[test]
    fn test_perfectly_concordant_sample_gives_unit_draws() {
        let x = [10.0, 15.0, 55.0, 72.0];
        let y = [3.0, 5.0, 20.0, 25.0];
        let dist = bootstrap_rank_correlation(&x, &y, 1_000, 7);
        assert!(dist.draws.iter().all(|r| (r - 1.0).abs() < 1e-12));
        // P(all four indices equal) = 4 / 256, so a few draws are excluded.
        assert!(dist.degenerate < 60);

        let (low, high) = dist.percentile_ci(0.95).unwrap();
        assert!((low - 1.0).abs() < 1e-12);
        assert!((high - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_sample_fails_ci() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [5.0; 4];
        let dist = bootstrap_rank_correlation(&x, &y, 100, 1);
        assert!(dist.draws.is_empty());
        assert_eq!(dist.degenerate, 100);
        assert!(matches!(
            dist.percentile_ci(0.95),
            Err(AnalysisError::InsufficientData { required: 2, available: 0 })
        ));
    }
}
