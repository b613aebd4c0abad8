//! Statistical building blocks.
//!
//! - Average-rank transform and Spearman correlation with a t-based p-value
//! - Paired percentile bootstrap with counter-seeded draws
//! - R-7 quantiles via O(n) selection
//! - Bivariate covariance and SVD pseudo-inverse

mod bootstrap;
mod covariance;
mod quantile;
mod ranks;
mod spearman;

pub use bootstrap::{
    bootstrap_rank_correlation, counter_rng_seed, paired_resample_into, BootstrapDistribution,
    MIN_VALID_DRAWS,
};
pub use covariance::{
    center, column_means, covariance, mahalanobis_sq, pseudo_inverse, Normalization, PseudoInverse,
};
pub use quantile::{compute_quantile, percentile_interval};
pub use ranks::average_ranks;
pub use spearman::{pearson, rank_correlation, spearman, SpearmanResult};
