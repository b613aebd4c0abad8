//! Calibration tests to verify statistical properties.
//!
//! Samples are drawn from known distributions with fixed seeds, so each test
//! is deterministic.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, StandardNormal};
use sunspot_cme::correlation::estimate;
use sunspot_cme::normality::{henze_zirkler, mardia, SkewnessForm};
use sunspot_cme::{AlignedSeries, CalendarKey};

const ALPHA: f64 = 0.05;

/// Bivariate normal with unit variances and correlation `r`.
fn correlated_normal(rng: &mut StdRng, n: usize, r: f64) -> Vec<Vector2<f64>> {
    let s = (1.0 - r * r).sqrt();
    (0..n)
        .map(|_| {
            let a: f64 = StandardNormal.sample(rng);
            let b: f64 = StandardNormal.sample(rng);
            Vector2::new(a, r * a + s * b)
        })
        .collect()
}

fn to_aligned(points: &[Vector2<f64>]) -> AlignedSeries {
    let keys = (0..points.len() as i32).map(|i| CalendarKey::Year(1000 + i)).collect();
    AlignedSeries::from_parts(
        keys,
        points.iter().map(|p| p.x).collect(),
        points.iter().map(|p| p.y).collect(),
    )
    .unwrap()
}

/// Verify the false positive rate of each test stays near alpha on normal data.
///
/// Uses Mardia's cross-product skewness kernel, which is calibrated under
/// normality.
#[test]
fn normality_fpr_calibration() {
    const TRIALS: usize = 200;
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    let (mut hz, mut skew, mut kurt) = (0, 0, 0);
    for _ in 0..TRIALS {
        let sample = correlated_normal(&mut rng, 100, 0.5);
        if henze_zirkler(&sample).p_value < ALPHA {
            hz += 1;
        }
        let m = mardia(&sample, SkewnessForm::CrossProduct);
        if m.skew_p_value < ALPHA {
            skew += 1;
        }
        if m.kurt_p_value < ALPHA {
            kurt += 1;
        }
    }

    for (name, rejections) in [("Henze-Zirkler", hz), ("skewness", skew), ("kurtosis", kurt)] {
        let rate = rejections as f64 / TRIALS as f64;
        assert!(rate <= 2.0 * ALPHA, "{name} FPR {rate} exceeds 2*alpha");
    }
}

/// Verify all three tests detect strongly skewed data.
#[test]
fn normality_power_on_exponential_data() {
    const TRIALS: usize = 50;
    let mut rng = StdRng::seed_from_u64(7);
    let exp = Exp::new(1.0).unwrap();

    let (mut hz, mut skew) = (0, 0);
    for _ in 0..TRIALS {
        let sample: Vec<Vector2<f64>> = (0..150)
            .map(|_| Vector2::new(exp.sample(&mut rng), exp.sample(&mut rng)))
            .collect();
        if henze_zirkler(&sample).p_value < ALPHA {
            hz += 1;
        }
        if mardia(&sample, SkewnessForm::CrossProduct).skew_p_value < ALPHA {
            skew += 1;
        }
    }

    assert!(hz as f64 / TRIALS as f64 > 0.9, "HZ power too low: {hz}/{TRIALS}");
    assert!(skew as f64 / TRIALS as f64 > 0.9, "skewness power too low: {skew}/{TRIALS}");
}

/// The pairwise-distance kernel has no calibrated null: it rejects normal data.
#[test]
fn pairwise_distance_skewness_rejects_normal_data() {
    let mut rng = StdRng::seed_from_u64(3);
    let sample = correlated_normal(&mut rng, 100, 0.3);
    assert!(mardia(&sample, SkewnessForm::PairwiseDistance).skew_p_value < ALPHA);
}

/// Verify the 95% bootstrap interval covers the population Spearman rho.
#[test]
fn bootstrap_ci_coverage() {
    const TRIALS: usize = 100;
    const R: f64 = 0.6;
    // Population Spearman rho of a bivariate normal.
    let true_rho = 6.0 / std::f64::consts::PI * (R / 2.0).asin();
    let mut rng = StdRng::seed_from_u64(42);

    let mut covered = 0;
    for trial in 0..TRIALS {
        let sample = correlated_normal(&mut rng, 40, R);
        let est = estimate(&to_aligned(&sample), 400, 5, trial as u64).unwrap();
        assert!(est.ci_low <= est.ci_high);
        if est.ci_low <= true_rho && true_rho <= est.ci_high {
            covered += 1;
        }
    }

    let coverage = covered as f64 / TRIALS as f64;
    assert!(coverage >= 0.85, "coverage {coverage} too far below 0.95");
}
