//! CME catalog CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::IngestError;
use crate::types::CmeEvent;

/// Timestamp layouts tried in order.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Header names of the timestamp and speed columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumns {
    /// Timestamp column (default `Fecha`).
    pub timestamp: String,
    /// Linear speed column in km/s (default `Rapidez`).
    pub speed: String,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            timestamp: "Fecha".to_string(),
            speed: "Rapidez".to_string(),
        }
    }
}

/// Parsed events with row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCatalog {
    /// Events with a valid timestamp and finite speed, in file order.
    pub events: Vec<CmeEvent>,
    /// Data rows read.
    pub rows_read: usize,
    /// Rows dropped for an unparseable timestamp or speed.
    pub rows_skipped: usize,
}

/// Parse a catalog from any reader.
///
/// # Errors
///
/// `MissingColumn` if either configured column is absent from the header,
/// `Csv` if the reader fails structurally.
pub fn read_cme_catalog<R: Read>(reader: R, columns: &CatalogColumns) -> Result<LoadedCatalog, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
    };
    let ts_idx = position(&columns.timestamp)?;
    let speed_idx = position(&columns.speed)?;

    let mut events = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for record in reader.records() {
        let record = record?;
        rows_read += 1;

        let timestamp = record.get(ts_idx).and_then(parse_timestamp);
        let speed = record
            .get(speed_idx)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite());

        match (timestamp, speed) {
            (Some(timestamp), Some(speed)) => events.push(CmeEvent::new(timestamp, speed)),
            _ => rows_skipped += 1,
        }
    }

    if rows_skipped > 0 {
        warn!(rows_skipped, rows_read, "dropped CME rows with unusable timestamp or speed");
    }
    info!(events = events.len(), "loaded CME catalog");

    Ok(LoadedCatalog {
        events,
        rows_read,
        rows_skipped,
    })
}

/// Open and parse a catalog file.
pub fn load_cme_catalog(path: impl AsRef<Path>, columns: &CatalogColumns) -> Result<LoadedCatalog, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_cme_catalog(file, columns)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const CATALOG: &str = "\
Fecha,Central,Ancho,Rapidez
2010-04-03 10:33:58,175,360,668
2011-06-07 06:49:00,Halo,360,1255
not a date,90,40,300
2012-01-23T04:00:05,12,360,----
2012-03-07,Halo,360,2684
";

    #[test]
    fn test_rows_are_parsed_and_counted() {
        let loaded = read_cme_catalog(CATALOG.as_bytes(), &CatalogColumns::default()).unwrap();
        assert_eq!(loaded.rows_read, 5);
        assert_eq!(loaded.rows_skipped, 2);
        assert_eq!(loaded.events.len(), 3);
        assert_eq!(loaded.events[0].speed_km_s, 668.0);
        assert_eq!(loaded.events[1].timestamp.hour(), 6);
        assert_eq!(loaded.events[2].timestamp.day(), 7);
    }

    #[test]
    fn test_custom_columns() {
        let text = "date,speed\n2015-09-01T12:00:00Z,450\n";
        let columns = CatalogColumns {
            timestamp: "date".into(),
            speed: "speed".into(),
        };
        let loaded = read_cme_catalog(text.as_bytes(), &columns).unwrap();
        assert_eq!(loaded.events.len(), 1);
        assert_eq!(loaded.events[0].timestamp.year(), 2015);
    }

    #[test]
    fn test_missing_column() {
        let err = read_cme_catalog("Fecha,Speed\n".as_bytes(), &CatalogColumns::default()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn(ref c) if c == "Rapidez"));
    }

    #[test]
    fn test_timestamp_layouts() {
        assert!(parse_timestamp("2003-10-28 11:30:05").is_some());
        assert!(parse_timestamp("2003/10/28 11:30:05").is_some());
        assert!(parse_timestamp("2003-10-28 11:30").is_some());
        assert!(parse_timestamp("2003-10-28T11:30:05.250").is_some());
        assert!(parse_timestamp("28/10/2003").is_none());
    }
}
