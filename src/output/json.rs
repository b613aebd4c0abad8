//! JSON serialization for analysis reports.

use serde::Serialize;

/// Serialize a report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for the
/// report types in this crate).
pub fn to_json<T: Serialize + ?Sized>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty<T: Serialize + ?Sized>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{CorrelationReport, CorrelationResult, Significance};
    use crate::types::Granularity;

    fn make_report() -> CorrelationReport {
        CorrelationReport {
            granularity: Granularity::YearMonth,
            period: None,
            bootstrap_iterations: 1000,
            min_sample_size: 12,
            results: vec![CorrelationResult {
                label: "Fast".to_string(),
                vmin: 1000.0,
                vmax: 1500.0,
                rho: 0.85,
                p_value: 0.0001,
                ci_low: 0.8,
                ci_high: 0.9,
                n_periods: 240,
                n_events: 1200,
                significance: Significance::VeryHigh,
                degenerate_draws: 0,
            }],
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&make_report()).unwrap();
        assert!(json.contains("\"rho\":0.85"));
        assert!(json.contains("\"significance\":\"***\""));
        assert!(json.contains("\"granularity\":\"year-month\""));
    }

    #[test]
    fn test_to_json_pretty_round_trips() {
        let report = make_report();
        let json = to_json_pretty(&report).unwrap();
        assert!(json.contains('\n'));
        let back: CorrelationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.results[0].label, "Fast");
        assert_eq!(back.results[0].significance, Significance::VeryHigh);
        assert_eq!(back.min_sample_size, report.min_sample_size);
    }
}
