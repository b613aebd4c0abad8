//! Velocity bins and per-period event counting.
//!
//! A [`BinScheme`] is an ordered list of half-open speed intervals
//! `[vmin, vmax)`. Schemes are validated when built (or deserialized), so
//! counting never sees overlapping or inverted bins. Bins need not cover the
//! whole speed range: events outside every bin are excluded from all counts.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::align::TimeSeries;
use crate::error::ConfigError;
use crate::types::{CalendarKey, CmeEvent, Granularity};

/// Half-open speed interval `[vmin, vmax)` with a semantic label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityBin {
    /// Inclusive lower bound in km/s.
    pub vmin: f64,
    /// Exclusive upper bound in km/s.
    pub vmax: f64,
    /// Semantic label shared across scheme variants.
    pub label: String,
}

impl VelocityBin {
    /// Create a bin.
    pub fn new(vmin: f64, vmax: f64, label: impl Into<String>) -> Self {
        Self {
            vmin,
            vmax,
            label: label.into(),
        }
    }

    /// Whether a speed falls inside the bin.
    #[inline]
    pub fn contains(&self, speed: f64) -> bool {
        self.vmin <= speed && speed < self.vmax
    }

    /// Bin centre, used for plotting against speed.
    pub fn center(&self) -> f64 {
        0.5 * (self.vmin + self.vmax)
    }
}

/// Ordered, non-overlapping collection of velocity bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VelocityBin>", into = "Vec<VelocityBin>")]
pub struct BinScheme {
    bins: Vec<VelocityBin>,
}

impl BinScheme {
    /// Build a scheme, validating bounds, ordering and label uniqueness.
    pub fn new(bins: Vec<VelocityBin>) -> Result<Self, ConfigError> {
        validate_bins(&bins)?;
        Ok(Self { bins })
    }

    /// Build a scheme from bins known to be valid.
    pub(crate) fn new_unchecked(bins: Vec<VelocityBin>) -> Self {
        debug_assert!(validate_bins(&bins).is_ok());
        Self { bins }
    }

    /// Build from `(vmin, vmax, label)` triples.
    pub fn from_triples<'a, I>(triples: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (f64, f64, &'a str)>,
    {
        Self::new(
            triples
                .into_iter()
                .map(|(vmin, vmax, label)| VelocityBin::new(vmin, vmax, label))
                .collect(),
        )
    }

    /// Bins in scheme order.
    pub fn bins(&self) -> &[VelocityBin] {
        &self.bins
    }

    /// Labels in scheme order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bins.iter().map(|b| b.label.as_str())
    }

    /// Look up a bin by label.
    pub fn bin(&self, label: &str) -> Option<&VelocityBin> {
        self.bins.iter().find(|b| b.label == label)
    }

    /// Bin containing a speed, if any.
    pub fn classify(&self, speed: f64) -> Option<&VelocityBin> {
        self.bins.iter().find(|b| b.contains(speed))
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Always false for a validated scheme.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

impl TryFrom<Vec<VelocityBin>> for BinScheme {
    type Error = ConfigError;

    fn try_from(bins: Vec<VelocityBin>) -> Result<Self, Self::Error> {
        Self::new(bins)
    }
}

impl From<BinScheme> for Vec<VelocityBin> {
    fn from(scheme: BinScheme) -> Self {
        scheme.bins
    }
}

fn validate_bins(bins: &[VelocityBin]) -> Result<(), ConfigError> {
    if bins.is_empty() {
        return Err(ConfigError::EmptyScheme);
    }

    let mut labels = HashSet::with_capacity(bins.len());
    for bin in bins {
        if !bin.vmin.is_finite() || !bin.vmax.is_finite() {
            return Err(ConfigError::NonFiniteBound {
                label: bin.label.clone(),
            });
        }
        if bin.vmin > bin.vmax {
            return Err(ConfigError::InvertedBin {
                label: bin.label.clone(),
                vmin: bin.vmin,
                vmax: bin.vmax,
            });
        }
        if !labels.insert(bin.label.as_str()) {
            return Err(ConfigError::DuplicateLabel(bin.label.clone()));
        }
    }

    for pair in bins.windows(2) {
        if pair[1].vmin < pair[0].vmax {
            return Err(ConfigError::OverlappingBins {
                first: pair[0].label.clone(),
                second: pair[1].label.clone(),
            });
        }
    }

    Ok(())
}

/// Per-period counts for one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinCounts {
    /// The bin these counts belong to.
    pub bin: VelocityBin,
    /// Event counts per calendar key. Periods with no events are absent.
    pub counts: TimeSeries,
    /// All events in the bin, including periods that may not align later.
    pub total_events: usize,
}

/// Counts for every bin of a scheme, in scheme order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedCounts {
    /// Granularity used for the calendar keys.
    pub granularity: Granularity,
    /// One entry per bin.
    pub bins: Vec<BinCounts>,
}

impl BinnedCounts {
    /// Counts for a label.
    pub fn get(&self, label: &str) -> Option<&BinCounts> {
        self.bins.iter().find(|b| b.bin.label == label)
    }
}

/// Count events per period within each bin of the scheme.
///
/// Events with a non-finite speed are ignored.
pub fn bin_and_count(
    events: &[CmeEvent],
    scheme: &BinScheme,
    granularity: Granularity,
) -> BinnedCounts {
    let bins = scheme
        .bins()
        .iter()
        .map(|bin| {
            let mut per_period: BTreeMap<CalendarKey, usize> = BTreeMap::new();
            let mut total_events = 0usize;

            for event in events.iter().filter(|e| bin.contains(e.speed_km_s)) {
                *per_period.entry(event.key(granularity)).or_insert(0) += 1;
                total_events += 1;
            }

            debug!(
                bin = %bin.label,
                vmin = bin.vmin,
                vmax = bin.vmax,
                total_events,
                periods = per_period.len(),
                "binned events"
            );

            // BTreeMap keys are unique, so construction cannot fail.
            let counts = TimeSeries::from_pairs(
                per_period
                    .into_iter()
                    .map(|(key, count)| (key, count as f64)),
            )
            .unwrap_or_default();

            BinCounts {
                bin: bin.clone(),
                counts,
                total_events,
            }
        })
        .collect();

    BinnedCounts { granularity, bins }
}

/// Count all events with a usable speed per period, regardless of bin.
pub fn count_per_period(events: &[CmeEvent], granularity: Granularity) -> TimeSeries {
    let mut per_period: BTreeMap<CalendarKey, usize> = BTreeMap::new();
    for event in events.iter().filter(|e| e.speed_km_s.is_finite()) {
        *per_period.entry(event.key(granularity)).or_insert(0) += 1;
    }
    TimeSeries::from_pairs(
        per_period
            .into_iter()
            .map(|(key, count)| (key, count as f64)),
    )
    .unwrap_or_default()
}
