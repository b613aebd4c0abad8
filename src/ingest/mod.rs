//! Loading the sunspot series and the CME catalog from disk.
//!
//! Malformed rows are skippable, not fatal: they are counted, logged at
//! `warn`, and left out. Structural problems (unreadable file, missing CSV
//! column, no usable rows at all) are returned as [`IngestError`].
//!
//! [`IngestError`]: crate::error::IngestError

mod cme;
mod sunspot;

pub use cme::{load_cme_catalog, read_cme_catalog, CatalogColumns, LoadedCatalog};
pub use sunspot::{load_sunspots, read_sunspots, SUNSPOT_MISSING};

use crate::align::TimeSeries;
use crate::types::{AnalysisPeriod, CmeEvent};

/// Events whose timestamp falls inside the period.
pub fn filter_events(events: &[CmeEvent], period: &AnalysisPeriod) -> Vec<CmeEvent> {
    events
        .iter()
        .filter(|e| period.contains_date(e.timestamp.date()))
        .copied()
        .collect()
}

/// Sunspot points whose key starts inside the period.
pub fn filter_sunspots(series: &TimeSeries, period: &AnalysisPeriod) -> TimeSeries {
    series.restrict_to(period)
}
