//! CSV export of correlation results and sensitivity summaries.

use std::io::Write;

use csv::Writer;

use crate::result::{CorrelationReport, Robustness, SensitivityReport};

/// Write one row per correlated bin.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_correlations_csv<W: Write>(out: W, report: &CorrelationReport) -> csv::Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record([
        "label",
        "vmin",
        "vmax",
        "rho",
        "p_value",
        "ci_low",
        "ci_high",
        "n_periods",
        "n_events",
        "significance",
    ])?;
    for r in &report.results {
        writer.write_record(&[
            r.label.clone(),
            r.vmin.to_string(),
            r.vmax.to_string(),
            r.rho.to_string(),
            r.p_value.to_string(),
            r.ci_low.to_string(),
            r.ci_high.to_string(),
            r.n_periods.to_string(),
            r.n_events.to_string(),
            r.significance.marker().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one row per label with both spread summaries.
///
/// Labels missing from one summary leave its columns empty.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_sensitivity_csv<W: Write>(out: W, report: &SensitivityReport) -> csv::Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record([
        "label",
        "baseline_rho",
        "mean_percent_deviation",
        "variants_compared",
        "robustness",
        "mean_rho",
        "min_rho",
        "max_rho",
        "percent_range",
    ])?;

    for (label, baseline_rho) in &report.baseline.estimates {
        let dev = report.deviation.iter().find(|d| &d.label == label);
        let spread = report.spread.iter().find(|s| &s.label == label);
        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

        writer.write_record(&[
            label.clone(),
            baseline_rho.to_string(),
            opt(dev.map(|d| d.mean_percent_deviation)),
            dev.map(|d| d.variants_compared.to_string()).unwrap_or_default(),
            dev.map(|d| robustness_name(Robustness::from_percent(d.mean_percent_deviation)).to_string())
                .unwrap_or_default(),
            opt(spread.map(|s| s.mean_rho)),
            opt(spread.map(|s| s.min_rho)),
            opt(spread.map(|s| s.max_rho)),
            opt(spread.map(|s| s.percent_range)),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn robustness_name(class: Robustness) -> &'static str {
    match class {
        Robustness::HighlyRobust => "highly robust",
        Robustness::Robust => "robust",
        Robustness::Sensitive => "sensitive",
    }
}
