//! Sensitivity of per-bin correlations to the choice of bin boundaries.
//!
//! The evaluator runs one correlation function over a baseline scheme and a
//! set of named variants, then summarizes each baseline label two ways:
//!
//! - [`percent_deviation`]: mean of `|ρᵥ - ρ_b| / |ρ_b| · 100` over variants
//!   that produced the label. Anchored on the baseline, so swapping which
//!   scheme is the baseline changes the result.
//! - [`range_spread`]: `(max - min) / |mean| · 100` over the baseline and
//!   every variant that produced the label.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::binning::BinScheme;
use crate::error::Result;
use crate::result::{SchemeCorrelations, SensitivityReport, SensitivitySummary, SpreadSummary};
use crate::types::Granularity;

/// A variant scheme with a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScheme {
    /// Display name, e.g. `"Moderate (+50 km/s)"`.
    pub name: String,
    /// The bins.
    pub scheme: BinScheme,
}

impl NamedScheme {
    /// Pair a scheme with its name.
    pub fn new(name: impl Into<String>, scheme: BinScheme) -> Self {
        Self {
            name: name.into(),
            scheme,
        }
    }
}

/// Run `correlation_fn` over the baseline and every variant and summarize.
///
/// A variant whose run fails is logged and left out of both summaries. Labels
/// missing from a variant are skipped for that variant.
///
/// # Errors
///
/// Propagates the baseline run's error, since nothing can be compared
/// without it.
pub fn evaluate<F>(
    granularity: Granularity,
    baseline: &BinScheme,
    variants: &[NamedScheme],
    mut correlation_fn: F,
) -> Result<SensitivityReport>
where
    F: FnMut(&BinScheme) -> Result<SchemeCorrelations>,
{
    let baseline_estimates = correlation_fn(baseline)?;
    info!(
        labels = baseline_estimates.estimates.len(),
        "baseline scheme evaluated"
    );

    let mut variant_estimates = Vec::with_capacity(variants.len());
    for variant in variants {
        match correlation_fn(&variant.scheme) {
            Ok(estimates) => variant_estimates.push((variant.name.clone(), estimates)),
            Err(err) => warn!(variant = %variant.name, %err, "variant scheme failed, skipping"),
        }
    }

    let deviation = percent_deviation(&baseline_estimates, &variant_estimates);
    let spread = range_spread(&baseline_estimates, &variant_estimates);

    Ok(SensitivityReport {
        granularity,
        baseline: baseline_estimates,
        variants: variant_estimates,
        deviation,
        spread,
    })
}

/// Baseline-anchored mean percentage deviation per baseline label.
///
/// Labels with a zero baseline estimate, or that no variant produced, are
/// omitted.
pub fn percent_deviation(
    baseline: &SchemeCorrelations,
    variants: &[(String, SchemeCorrelations)],
) -> Vec<SensitivitySummary> {
    baseline
        .estimates
        .iter()
        .filter_map(|(label, baseline_rho)| {
            if *baseline_rho == 0.0 {
                warn!(%label, "baseline rho is zero, percentage deviation undefined");
                return None;
            }
            let deviations: Vec<f64> = variants
                .iter()
                .filter_map(|(_, v)| v.get(label))
                .map(|rho| (rho - baseline_rho).abs() / baseline_rho.abs() * 100.0)
                .collect();
            if deviations.is_empty() {
                return None;
            }
            Some(SensitivitySummary {
                label: label.clone(),
                baseline_rho: *baseline_rho,
                mean_percent_deviation: deviations.iter().sum::<f64>() / deviations.len() as f64,
                variants_compared: deviations.len(),
            })
        })
        .collect()
}

/// Max-minus-min over mean spread per baseline label.
///
/// Needs at least two schemes with the label. Labels whose mean estimate is
/// zero are omitted.
pub fn range_spread(
    baseline: &SchemeCorrelations,
    variants: &[(String, SchemeCorrelations)],
) -> Vec<SpreadSummary> {
    baseline
        .estimates
        .iter()
        .filter_map(|(label, baseline_rho)| {
            let values: Vec<f64> = std::iter::once(*baseline_rho)
                .chain(variants.iter().filter_map(|(_, v)| v.get(label)))
                .collect();
            if values.len() < 2 {
                return None;
            }
            let mean_rho = values.iter().sum::<f64>() / values.len() as f64;
            if mean_rho == 0.0 {
                warn!(%label, "mean rho is zero, percentage range undefined");
                return None;
            }
            let min_rho = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max_rho = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(SpreadSummary {
                label: label.clone(),
                mean_rho,
                min_rho,
                max_rho,
                percent_range: (max_rho - min_rho) / mean_rho.abs() * 100.0,
                schemes_compared: values.len(),
            })
        })
        .collect()
}
