//! Calendar-key alignment of two time series.
//!
//! The aligner performs an inner join on [`CalendarKey`]: the output keeps
//! the key order of the left series, restricted to keys also present in the
//! right series, and drops rows where either value is missing.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{AnalysisPeriod, CalendarKey, TimePoint};

/// A time series with unique calendar keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesPoints")]
pub struct TimeSeries {
    points: Vec<TimePoint>,
}

#[derive(Deserialize)]
struct SeriesPoints {
    points: Vec<TimePoint>,
}

impl TryFrom<SeriesPoints> for TimeSeries {
    type Error = ConfigError;

    fn try_from(raw: SeriesPoints) -> Result<Self, Self::Error> {
        Self::new(raw.points)
    }
}

impl TimeSeries {
    /// Build a series, rejecting duplicate keys.
    pub fn new(points: Vec<TimePoint>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::with_capacity(points.len());
        for point in &points {
            if !seen.insert(point.key) {
                return Err(ConfigError::DuplicateKey(point.key));
            }
        }
        Ok(Self { points })
    }

    /// Build a series from `(key, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (CalendarKey, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(key, value)| TimePoint::new(key, value))
                .collect(),
        )
    }

    /// Points in their original order.
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Keep only points whose key starts inside the period.
    pub fn restrict_to(&self, period: &AnalysisPeriod) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| period.contains_key(&p.key))
                .copied()
                .collect(),
        }
    }

    /// Value recorded for a key, if any.
    pub fn get(&self, key: &CalendarKey) -> Option<f64> {
        self.points.iter().find(|p| p.key == *key).map(|p| p.value)
    }
}

/// Inner join of two series: equal-length `keys`, `x` and `y`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AlignedParts")]
pub struct AlignedSeries {
    keys: Vec<CalendarKey>,
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Deserialize)]
struct AlignedParts {
    keys: Vec<CalendarKey>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TryFrom<AlignedParts> for AlignedSeries {
    type Error = ConfigError;

    fn try_from(raw: AlignedParts) -> Result<Self, Self::Error> {
        Self::from_parts(raw.keys, raw.x, raw.y)
    }
}

impl AlignedSeries {
    /// Build from already-paired sequences.
    ///
    /// # Errors
    ///
    /// Fails if the three sequences differ in length or a key repeats.
    pub fn from_parts(keys: Vec<CalendarKey>, x: Vec<f64>, y: Vec<f64>) -> Result<Self, ConfigError> {
        if keys.len() != x.len() || x.len() != y.len() {
            return Err(ConfigError::LengthMismatch {
                keys: keys.len(),
                x: x.len(),
                y: y.len(),
            });
        }
        let mut seen = HashSet::with_capacity(keys.len());
        if let Some(dup) = keys.iter().find(|k| !seen.insert(**k)) {
            return Err(ConfigError::DuplicateKey(*dup));
        }
        Ok(Self { keys, x, y })
    }

    /// Shared calendar keys.
    pub fn keys(&self) -> &[CalendarKey] {
        &self.keys
    }

    /// Left-series values (activity index).
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Right-series values (event counts).
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of paired points.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the join produced no pairs.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over `(x, y)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Inner-join two series on calendar key.
///
/// Output order follows `left`; rows whose value is non-finite on either
/// side are dropped. Disjoint key sets produce an empty result.
pub fn align(left: &TimeSeries, right: &TimeSeries) -> AlignedSeries {
    let lookup: HashMap<CalendarKey, f64> =
        right.points().iter().map(|p| (p.key, p.value)).collect();

    let mut keys = Vec::new();
    let mut x = Vec::new();
    let mut y = Vec::new();

    for point in left.points() {
        let Some(&other) = lookup.get(&point.key) else {
            continue;
        };
        if !point.value.is_finite() || !other.is_finite() {
            continue;
        }
        keys.push(point.key);
        x.push(point.value);
        y.push(other);
    }

    AlignedSeries { keys, x, y }
}
