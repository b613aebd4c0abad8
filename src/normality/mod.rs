//! Multivariate normality battery for the paired (activity, count) sample.
//!
//! Three sub-tests run on the same sample: Henze–Zirkler, Mardia skewness
//! and Mardia kurtosis. Each rejects when its p-value falls below the
//! significance level, and normality is rejected overall if any of them
//! rejects.

mod henze_zirkler;
mod mardia;

pub use henze_zirkler::{henze_zirkler, smoothing_beta, HenzeZirklerResult};
pub use mardia::{mardia, MardiaResult, SkewnessForm};

use nalgebra::Vector2;
use tracing::debug;

use crate::align::AlignedSeries;
use crate::error::{AnalysisError, Result};
use crate::result::{NormalityReport, NormalityVerdict};

/// Dimension of the paired sample.
const DIMENSION: usize = 2;

/// Sub-test names as they appear in reports.
pub const HENZE_ZIRKLER: &str = "Henze-Zirkler";
/// Mardia skewness sub-test name.
pub const MARDIA_SKEWNESS: &str = "Mardia skewness";
/// Mardia kurtosis sub-test name.
pub const MARDIA_KURTOSIS: &str = "Mardia kurtosis";

/// Run the battery with the default skewness kernel.
///
/// # Errors
///
/// `InsufficientData` with fewer than three paired observations.
pub fn test(aligned: &AlignedSeries, alpha: f64) -> Result<NormalityReport> {
    test_with(aligned, alpha, SkewnessForm::default())
}

/// Run the battery with an explicit Mardia skewness kernel.
pub fn test_with(aligned: &AlignedSeries, alpha: f64, form: SkewnessForm) -> Result<NormalityReport> {
    let n = aligned.len();
    if n < DIMENSION + 1 {
        return Err(AnalysisError::InsufficientData {
            required: DIMENSION + 1,
            available: n,
        });
    }

    let points: Vec<Vector2<f64>> = aligned.pairs().map(|(x, y)| Vector2::new(x, y)).collect();

    let hz = henze_zirkler(&points);
    let md = mardia(&points, form);

    let henze_zirkler = NormalityVerdict::new(HENZE_ZIRKLER, hz.statistic, hz.p_value, alpha);
    let mardia_skew = NormalityVerdict::new(MARDIA_SKEWNESS, md.skew_chi2, md.skew_p_value, alpha);
    let mardia_kurt = NormalityVerdict::new(MARDIA_KURTOSIS, md.kurt_z, md.kurt_p_value, alpha);
    let overall_rejected = henze_zirkler.rejected || mardia_skew.rejected || mardia_kurt.rejected;

    debug!(
        n,
        hz = hz.statistic,
        hz_p = hz.p_value,
        skew_chi2 = md.skew_chi2,
        skew_p = md.skew_p_value,
        kurt_z = md.kurt_z,
        kurt_p = md.kurt_p_value,
        overall_rejected,
        "normality battery complete"
    );

    Ok(NormalityReport {
        henze_zirkler,
        mardia_skew,
        mardia_kurt,
        overall_rejected,
        n_observations: n,
        alpha,
        singular_covariance: hz.singular_covariance || md.singular_covariance,
        skewness_form: form,
    })
}
