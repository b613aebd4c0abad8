//! SILSO sunspot number files.
//!
//! Annual files (`SN_y_tot_V2.0.txt`) start each line with the mid-year
//! fractional date and the yearly mean:
//!
//! ```text
//! 2009.5     4.8   0.4   1007 1
//! ```
//!
//! Monthly files (`SN_m_tot_V2.0.txt`) carry year, month, fractional date
//! and the monthly mean:
//!
//! ```text
//! 2009 01 2009.042    2.3   0.6  ...
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::align::TimeSeries;
use crate::error::IngestError;
use crate::types::{CalendarKey, Granularity, TimePoint};

/// Value SILSO writes for periods without observations.
pub const SUNSPOT_MISSING: f64 = -1.0;

/// Parse a SILSO file at the given granularity.
///
/// Negative values become NaN so they drop out at alignment. Lines that do
/// not parse are skipped and counted.
pub fn read_sunspots<R: BufRead>(reader: R, granularity: Granularity) -> Result<TimeSeries, IngestError> {
    let mut points = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(IngestError::Read)?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_line(trimmed, granularity) {
            Some(point) => points.push(point),
            None => {
                debug!(line = line_no + 1, "unparseable sunspot line");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped malformed sunspot lines");
    }
    if points.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(TimeSeries::new(points)?)
}

/// Open and parse a SILSO file.
pub fn load_sunspots(path: impl AsRef<Path>, granularity: Granularity) -> Result<TimeSeries, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_sunspots(BufReader::new(file), granularity).map_err(|err| match err {
        IngestError::Read(source) => IngestError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

fn parse_line(line: &str, granularity: Granularity) -> Option<TimePoint> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (key, raw) = match granularity {
        Granularity::Year => {
            let year: f64 = fields.first()?.parse().ok()?;
            (CalendarKey::Year(year.floor() as i32), fields.get(1)?)
        }
        Granularity::YearMonth => {
            let year: i32 = fields.first()?.parse().ok()?;
            let month: u32 = fields.get(1)?.parse().ok()?;
            if !(1..=12).contains(&month) {
                return None;
            }
            (CalendarKey::Month { year, month }, fields.get(3)?)
        }
    };
    let value: f64 = raw.parse().ok()?;
    let value = if value < 0.0 { f64::NAN } else { value };
    Some(TimePoint::new(key, value))
}
