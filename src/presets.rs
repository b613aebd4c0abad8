//! Built-in bin schemes used by the published analysis.
//!
//! The baseline splits CMEs into slow, moderate, fast and extreme speeds.
//! Sensitivity variants shift the inner boundaries by ±25 or ±50 km/s and
//! keep the labels, so estimates can be compared label by label.

use crate::binning::{BinScheme, VelocityBin};
use crate::sensitivity::NamedScheme;

/// Upper edge of the fastest bin in every preset, in km/s.
pub const MAX_SPEED_KM_S: f64 = 3000.0;

/// Labels shared by every preset, slowest first.
pub const LABELS: [&str; 4] = ["Slow", "Moderate", "Fast", "Extreme"];

fn scheme(edges: [f64; 5]) -> BinScheme {
    BinScheme::new_unchecked(
        edges
            .windows(2)
            .zip(LABELS)
            .map(|(w, label)| VelocityBin::new(w[0], w[1], label))
            .collect(),
    )
}

/// Baseline scheme: 0-600, 600-1000, 1000-1500, 1500-3000 km/s.
pub fn baseline() -> BinScheme {
    scheme([0.0, 600.0, 1000.0, 1500.0, MAX_SPEED_KM_S])
}

/// Boundary perturbations compared against [`baseline`].
///
/// The "Slight (-25 km/s)" variant starts at 50 km/s, so the slowest events
/// fall outside every bin in that variant.
pub fn variants() -> Vec<NamedScheme> {
    [
        ("Moderate (-50 km/s)", [0.0, 550.0, 950.0, 1450.0, MAX_SPEED_KM_S]),
        ("Moderate (+50 km/s)", [0.0, 650.0, 1050.0, 1550.0, MAX_SPEED_KM_S]),
        ("Slight (-25 km/s)", [50.0, 575.0, 975.0, 1475.0, MAX_SPEED_KM_S]),
        ("Slight (+25 km/s)", [0.0, 625.0, 1025.0, 1525.0, MAX_SPEED_KM_S]),
    ]
    .into_iter()
    .map(|(name, edges)| NamedScheme::new(name, scheme(edges)))
    .collect()
}
