//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use super::export::robustness_name;
use crate::result::{
    CorrelationReport, NormalityReport, NormalityVerdict, Robustness, SensitivityReport, Significance,
};

fn separator() -> String {
    "\u{2500}".repeat(72)
}

fn header(title: &str) -> String {
    let sep = separator();
    format!("{}\n{sep}\n", title.bold())
}

/// Format a correlation report for terminal output.
pub fn format_correlation(report: &CorrelationReport) -> String {
    let mut output = header("Sunspot number vs CME counts: Spearman correlation");

    output.push_str(&format!(
        "  Granularity: {}   Bootstrap: {} resamples   Min periods: {}\n",
        report.granularity, report.bootstrap_iterations, report.min_sample_size
    ));
    if let Some(period) = &report.period {
        output.push_str(&format!("  Period: {period}\n"));
    }
    output.push('\n');

    output.push_str(&format!(
        "  {:<12} {:>12} {:>8} {:>10} {:>18} {:>6} {:>7}\n",
        "Bin", "Speed km/s", "rho", "p", "95% CI", "n", "events"
    ));
    for r in &report.results {
        let range = format!("{:.0}-{:.0}", r.vmin, r.vmax);
        let ci = format!("[{:.3}, {:.3}]", r.ci_low, r.ci_high);
        output.push_str(&format!(
            "  {:<12} {:>12} {:>8.3} {:>10.2e} {:>18} {:>6} {:>7}  {}\n",
            r.label,
            range,
            r.rho,
            r.p_value,
            ci,
            r.n_periods,
            r.n_events,
            format_significance(r.significance)
        ));
    }

    if !report.skipped.is_empty() {
        output.push('\n');
        for s in &report.skipped {
            output.push_str(&format!(
                "  {} {}: {}\n",
                "\u{26A0}".yellow(),
                s.label,
                s.reason
            ));
        }
    }

    output.push_str(&separator());
    output.push('\n');
    output.push_str("Note: *** p<0.001, ** p<0.01, * p<0.05, ns not significant.\n");
    output
}

/// Format the normality battery for terminal output.
pub fn format_normality(report: &NormalityReport) -> String {
    let mut output = header("Bivariate normality: sunspot number and CME counts");
    output.push_str(&format!(
        "  Observations: {}   alpha: {}\n\n",
        report.n_observations, report.alpha
    ));

    for verdict in report.verdicts() {
        output.push_str(&format_verdict(verdict));
    }
    output.push('\n');

    if report.singular_covariance {
        output.push_str(&format!(
            "  {}\n",
            "\u{26A0} Singular covariance, pseudo-inverse used".yellow()
        ));
    }

    if report.overall_rejected {
        output.push_str(&format!(
            "  {}\n",
            format!(
                "\u{2717} Normality rejected by {} of 3 tests: use rank correlation",
                report.rejection_count()
            )
            .red()
            .bold()
        ));
    } else {
        output.push_str(&format!(
            "  {}\n",
            "\u{2713} Normality not rejected".green().bold()
        ));
    }

    output.push_str(&separator());
    output.push('\n');
    output
}

fn format_verdict(verdict: &NormalityVerdict) -> String {
    let decision = if verdict.rejected {
        "reject".red().to_string()
    } else {
        "accept".green().to_string()
    };
    format!(
        "  {:<18} stat = {:>12.4}   p = {:>10.3e}   {}\n",
        verdict.test, verdict.statistic, verdict.p_value, decision
    )
}

/// Format a sensitivity report for terminal output.
pub fn format_sensitivity(report: &SensitivityReport) -> String {
    let mut output = header("Sensitivity of correlations to bin boundaries");
    output.push_str(&format!(
        "  Granularity: {}   Variants evaluated: {}\n\n",
        report.granularity,
        report.variants.len()
    ));

    output.push_str(&format!("  {:<24}", "Scheme"));
    for (label, _) in &report.baseline.estimates {
        output.push_str(&format!(" {:>10}", label));
    }
    output.push('\n');

    let rows = std::iter::once(("Baseline", &report.baseline))
        .chain(report.variants.iter().map(|(name, sc)| (name.as_str(), sc)));
    for (name, sc) in rows {
        output.push_str(&format!("  {:<24}", name));
        for (label, _) in &report.baseline.estimates {
            match sc.get(label) {
                Some(rho) => output.push_str(&format!(" {:>10.3}", rho)),
                None => output.push_str(&format!(" {:>10}", "-")),
            }
        }
        output.push('\n');
    }
    output.push('\n');

    if !report.deviation.is_empty() {
        output.push_str("  Mean deviation from baseline:\n");
        for d in &report.deviation {
            output.push_str(&format!(
                "    {:<12} {:>7.2}%  ({} variants)  {}\n",
                d.label,
                d.mean_percent_deviation,
                d.variants_compared,
                format_robustness(Robustness::from_percent(d.mean_percent_deviation))
            ));
        }
    }

    if !report.spread.is_empty() {
        output.push_str("  Range across schemes:\n");
        for s in &report.spread {
            output.push_str(&format!(
                "    {:<12} {:>7.2}%  (rho {:.3} to {:.3})  {}\n",
                s.label,
                s.percent_range,
                s.min_rho,
                s.max_rho,
                format_robustness(Robustness::from_percent(s.percent_range))
            ));
        }
    }

    output.push_str(&separator());
    output.push('\n');
    output
}

fn format_significance(sig: Significance) -> String {
    match sig {
        Significance::NotSignificant => sig.marker().dimmed().to_string(),
        _ => sig.marker().green().bold().to_string(),
    }
}

fn format_robustness(class: Robustness) -> String {
    let name = robustness_name(class);
    match class {
        Robustness::HighlyRobust => name.green().to_string(),
        Robustness::Robust => name.yellow().to_string(),
        Robustness::Sensitive => name.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normality::SkewnessForm;
    use crate::result::SchemeCorrelations;
    use crate::types::Granularity;

    #[test]
    fn test_normality_summary_mentions_rejections() {
        colored::control::set_override(false);
        let report = NormalityReport {
            henze_zirkler: NormalityVerdict::new("Henze-Zirkler", 3.2, 0.001, 0.05),
            mardia_skew: NormalityVerdict::new("Mardia skewness", 1.0, 0.4, 0.05),
            mardia_kurt: NormalityVerdict::new("Mardia kurtosis", 0.5, 0.6, 0.05),
            overall_rejected: true,
            n_observations: 29,
            alpha: 0.05,
            singular_covariance: false,
            skewness_form: SkewnessForm::PairwiseDistance,
        };
        let text = format_normality(&report);
        assert!(text.contains("Henze-Zirkler"));
        assert!(text.contains("rejected by 1 of 3"));
    }

    #[test]
    fn test_sensitivity_table_marks_missing_labels() {
        colored::control::set_override(false);
        let mut baseline = SchemeCorrelations::default();
        baseline.push("Slow", 0.8);
        baseline.push("Fast", 0.6);
        let mut variant = SchemeCorrelations::default();
        variant.push("Slow", 0.78);
        let report = SensitivityReport {
            granularity: Granularity::Year,
            baseline,
            variants: vec![("Slight (+25 km/s)".to_string(), variant)],
            deviation: Vec::new(),
            spread: Vec::new(),
        };
        let text = format_sensitivity(&report);
        assert!(text.contains("Slight (+25 km/s)"));
        assert!(text.contains("0.780"));
        assert!(text.lines().any(|l| l.contains("Slight") && l.trim_end().ends_with('-')));
    }
}
