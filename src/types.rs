//! Type aliases and common types.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

/// 2x2 covariance matrix for the paired (activity, count) sample.
pub type Matrix2x2 = Matrix2<f64>;

/// Temporal resolution used to group events and join series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// Calendar year.
    #[default]
    #[serde(alias = "annual")]
    Year,
    /// Calendar month, keyed by its first day.
    #[serde(alias = "monthly")]
    YearMonth,
}

impl Granularity {
    /// Resolve a date to the calendar key at this granularity.
    pub fn key_for(self, date: NaiveDate) -> CalendarKey {
        match self {
            Granularity::Year => CalendarKey::Year(date.year()),
            Granularity::YearMonth => CalendarKey::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    /// Minimum aligned periods required for a bootstrapped correlation.
    ///
    /// A full annual or monthly cycle is the smallest meaningful window.
    pub fn default_min_sample_size(self) -> usize {
        match self {
            Granularity::Year => 5,
            Granularity::YearMonth => 12,
        }
    }

    /// Minimum aligned periods for a point estimate in sensitivity runs.
    pub fn default_sensitivity_min_sample_size(self) -> usize {
        match self {
            Granularity::Year => 3,
            Granularity::YearMonth => 10,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Year => f.write_str("annual"),
            Granularity::YearMonth => f.write_str("monthly"),
        }
    }
}

/// Calendar key shared by the sunspot series and the binned event counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CalendarKey {
    /// A whole year.
    Year(i32),
    /// A month, normalized to its first day.
    Month {
        /// Calendar year.
        year: i32,
        /// Month number, 1-12.
        month: u32,
    },
}

impl CalendarKey {
    /// First day covered by this key, if the key is a valid date.
    pub fn start_date(&self) -> Option<NaiveDate> {
        match *self {
            CalendarKey::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1),
            CalendarKey::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
        }
    }

    /// Granularity this key belongs to.
    pub fn granularity(&self) -> Granularity {
        match self {
            CalendarKey::Year(_) => Granularity::Year,
            CalendarKey::Month { .. } => Granularity::YearMonth,
        }
    }
}

impl fmt::Display for CalendarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarKey::Year(year) => write!(f, "{year}"),
            CalendarKey::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}

/// A (calendar key, value) pair. Non-finite values mark missing data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Calendar key of the observation.
    pub key: CalendarKey,
    /// Observed value (sunspot number or event count).
    pub value: f64,
}

impl TimePoint {
    /// Create a new time point.
    pub fn new(key: CalendarKey, value: f64) -> Self {
        Self { key, value }
    }
}

/// A coronal mass ejection with its resolved timestamp and transit speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmeEvent {
    /// First-appearance timestamp.
    pub timestamp: NaiveDateTime,
    /// Linear speed in km/s.
    pub speed_km_s: f64,
}

impl CmeEvent {
    /// Create a new event.
    pub fn new(timestamp: NaiveDateTime, speed_km_s: f64) -> Self {
        Self {
            timestamp,
            speed_km_s,
        }
    }

    /// Calendar key of the event at the given granularity.
    pub fn key(&self, granularity: Granularity) -> CalendarKey {
        granularity.key_for(self.timestamp.date())
    }
}

/// Inclusive date range restricting an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
}

impl AnalysisPeriod {
    /// Create a period. Bounds are validated by [`crate::Config::validate`].
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether a date falls inside the period.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the first day of a calendar key falls inside the period.
    pub fn contains_key(&self, key: &CalendarKey) -> bool {
        key.start_date().is_some_and(|d| self.contains_date(d))
    }
}

impl fmt::Display for AnalysisPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
