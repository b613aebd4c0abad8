//! Main `CmeAnalysis` entry point and builder.

use tracing::{debug, info, warn};

use crate::align::{align, TimeSeries};
use crate::binning::{bin_and_count, count_per_period, BinScheme};
use crate::config::Config;
use crate::correlation::{estimate, point_estimate};
use crate::error::{AnalysisError, ConfigError, Result};
use crate::ingest::{filter_events, filter_sunspots};
use crate::normality::{self, SkewnessForm};
use crate::result::{
    CorrelationReport, CorrelationResult, NormalityReport, SchemeCorrelations, SensitivityReport,
    Significance, SkippedBin,
};
use crate::sensitivity::{self, NamedScheme};
use crate::statistics::counter_rng_seed;
use crate::types::{AnalysisPeriod, CmeEvent, Granularity};

/// Main entry point for sunspot/CME analyses.
///
/// Use the builder pattern to configure a run, then call one of
/// [`correlate`](Self::correlate), [`normality`](Self::normality) or
/// [`sensitivity`](Self::sensitivity). Every call validates the
/// configuration first and owns its data end to end.
///
/// # Example
///
/// ```ignore
/// use sunspot_cme::{presets, CmeAnalysis};
///
/// let report = CmeAnalysis::monthly()
///     .bootstrap_iterations(2_000)
///     .seed(42)
///     .correlate(&sunspots, &events, &presets::baseline())?;
///
/// for r in &report.results {
///     println!("{}: rho = {:.3} {}", r.label, r.rho, r.significance);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CmeAnalysis {
    config: Config,
}

impl CmeAnalysis {
    /// Create from an explicit configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Annual analysis with default settings.
    pub fn annual() -> Self {
        Self::new(Config::annual())
    }

    /// Monthly analysis with default settings.
    pub fn monthly() -> Self {
        Self::new(Config::monthly())
    }

    /// Set the number of bootstrap resamples.
    pub fn bootstrap_iterations(mut self, n: usize) -> Self {
        self.config.bootstrap_iterations = n;
        self
    }

    /// Set the base bootstrap seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Override the minimum aligned periods for a correlation.
    pub fn min_sample_size(mut self, n: usize) -> Self {
        self.config.min_sample_size = Some(n);
        self
    }

    /// Override the minimum aligned periods for sensitivity estimates.
    pub fn sensitivity_min_sample_size(mut self, n: usize) -> Self {
        self.config.sensitivity_min_sample_size = Some(n);
        self
    }

    /// Set the significance level for the normality battery.
    pub fn significance_level(mut self, alpha: f64) -> Self {
        self.config.significance_level = alpha;
        self
    }

    /// Restrict both inputs to an inclusive date range.
    pub fn period(mut self, period: AnalysisPeriod) -> Self {
        self.config.period = Some(period);
        self
    }

    /// Choose the Mardia skewness pair kernel.
    pub fn mardia_skewness(mut self, form: SkewnessForm) -> Self {
        self.config.mardia_skewness = form;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Correlate the sunspot series with per-bin event counts.
    ///
    /// Bins with too few aligned periods, or a constant coordinate, are
    /// reported in `skipped` rather than failing the run. Each bin's
    /// bootstrap uses its own seed derived from the base seed and the bin
    /// index.
    ///
    /// # Errors
    ///
    /// `Configuration` if the config is invalid or the sunspot series is
    /// keyed at a different granularity.
    pub fn correlate(
        &self,
        sunspots: &TimeSeries,
        events: &[CmeEvent],
        scheme: &BinScheme,
    ) -> Result<CorrelationReport> {
        self.check_inputs(sunspots)?;
        let (sunspots, events) = self.restrict(sunspots, events);
        let granularity = self.config.granularity;
        let min_sample_size = self.config.min_sample_size();

        info!(
            %granularity,
            bins = scheme.len(),
            events = events.len(),
            periods = sunspots.len(),
            iterations = self.config.bootstrap_iterations,
            "correlating sunspot number with CME counts"
        );

        let binned = bin_and_count(&events, scheme, granularity);
        let mut results = Vec::with_capacity(binned.bins.len());
        let mut skipped = Vec::new();

        for (index, counts) in binned.bins.iter().enumerate() {
            let aligned = align(&sunspots, &counts.counts);
            let seed = counter_rng_seed(self.config.seed, index as u64);

            match estimate(
                &aligned,
                self.config.bootstrap_iterations,
                min_sample_size,
                seed,
            ) {
                Ok(est) => results.push(CorrelationResult {
                    label: counts.bin.label.clone(),
                    vmin: counts.bin.vmin,
                    vmax: counts.bin.vmax,
                    rho: est.rho,
                    p_value: est.p_value,
                    ci_low: est.ci_low,
                    ci_high: est.ci_high,
                    n_periods: est.n,
                    n_events: counts.total_events,
                    significance: Significance::from_p_value(est.p_value),
                    degenerate_draws: est.degenerate_draws,
                }),
                Err(err) if err.is_insufficient_data() => {
                    warn!(bin = %counts.bin.label, periods = aligned.len(), %err, "skipping bin");
                    skipped.push(SkippedBin {
                        label: counts.bin.label.clone(),
                        n_periods: aligned.len(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(CorrelationReport {
            granularity,
            period: self.config.period,
            bootstrap_iterations: self.config.bootstrap_iterations,
            min_sample_size,
            results,
            skipped,
        })
    }

    /// Test joint normality of the sunspot number and total CME counts.
    ///
    /// # Errors
    ///
    /// `InsufficientData` with fewer than three aligned periods, or
    /// `Configuration` as for [`correlate`](Self::correlate).
    pub fn normality(&self, sunspots: &TimeSeries, events: &[CmeEvent]) -> Result<NormalityReport> {
        self.check_inputs(sunspots)?;
        let (sunspots, events) = self.restrict(sunspots, events);
        let counts = count_per_period(&events, self.config.granularity);
        let aligned = align(&sunspots, &counts);

        info!(
            granularity = %self.config.granularity,
            periods = aligned.len(),
            alpha = self.config.significance_level,
            "testing bivariate normality"
        );

        normality::test_with(
            &aligned,
            self.config.significance_level,
            self.config.mardia_skewness,
        )
    }

    /// Compare per-bin point estimates across bin-boundary variants.
    ///
    /// Uses the sensitivity minimum sample size. Bins below it are left out
    /// of their scheme's estimates.
    ///
    /// # Errors
    ///
    /// `Configuration` as for [`correlate`](Self::correlate), or the
    /// baseline scheme's error.
    pub fn sensitivity(
        &self,
        sunspots: &TimeSeries,
        events: &[CmeEvent],
        baseline: &BinScheme,
        variants: &[NamedScheme],
    ) -> Result<SensitivityReport> {
        self.check_inputs(sunspots)?;
        let (sunspots, events) = self.restrict(sunspots, events);
        let granularity = self.config.granularity;
        let min_sample_size = self.config.sensitivity_min_sample_size();

        info!(
            %granularity,
            variants = variants.len(),
            min_sample_size,
            "evaluating bin boundary sensitivity"
        );

        sensitivity::evaluate(granularity, baseline, variants, |scheme| {
            let binned = bin_and_count(&events, scheme, granularity);
            let mut estimates = SchemeCorrelations::default();
            for counts in &binned.bins {
                let aligned = align(&sunspots, &counts.counts);
                match point_estimate(&aligned, min_sample_size) {
                    Ok(rho) => estimates.push(counts.bin.label.clone(), rho),
                    Err(err) if err.is_insufficient_data() => {
                        debug!(bin = %counts.bin.label, %err, "no estimate for bin");
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(estimates)
        })
    }

    fn check_inputs(&self, sunspots: &TimeSeries) -> Result<()> {
        self.config.validate()?;
        let expected = self.config.granularity;
        if let Some(point) = sunspots.points().first() {
            let found = point.key.granularity();
            if found != expected {
                return Err(AnalysisError::Configuration(ConfigError::InvalidParameter {
                    name: "granularity",
                    reason: format!("sunspot series is {found} but the analysis is {expected}"),
                }));
            }
        }
        Ok(())
    }

    fn restrict(&self, sunspots: &TimeSeries, events: &[CmeEvent]) -> (TimeSeries, Vec<CmeEvent>) {
        match &self.config.period {
            Some(period) => (
                filter_sunspots(sunspots, period),
                filter_events(events, period),
            ),
            None => (sunspots.clone(), events.to_vec()),
        }
    }
}

impl From<Granularity> for CmeAnalysis {
    fn from(granularity: Granularity) -> Self {
        Self::new(Config {
            granularity,
            ..Config::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use crate::types::CalendarKey;
    use chrono::NaiveDate;

    fn event(year: i32, month: u32, speed: f64) -> CmeEvent {
        CmeEvent::new(
            NaiveDate::from_ymd_opt(year, month, 15)
                .unwrap()
                .and_hms_opt(6, 30, 0)
                .unwrap(),
            speed,
        )
    }

    fn annual_sunspots(values: &[(i32, f64)]) -> TimeSeries {
        TimeSeries::from_pairs(values.iter().map(|&(y, v)| (CalendarKey::Year(y), v))).unwrap()
    }

    #[test]
    fn test_builder_overrides() {
        let analysis = CmeAnalysis::monthly()
            .bootstrap_iterations(50)
            .seed(7)
            .min_sample_size(20)
            .significance_level(0.01);
        assert_eq!(analysis.config().granularity, Granularity::YearMonth);
        assert_eq!(analysis.config().bootstrap_iterations, 50);
        assert_eq!(analysis.config().seed, 7);
        assert_eq!(analysis.config().min_sample_size(), 20);
        assert_eq!(analysis.config().sensitivity_min_sample_size(), 10);
    }

    #[test]
    fn test_sparse_bins_are_skipped() {
        let sunspots = annual_sunspots(&[(2009, 3.0), (2010, 25.0), (2011, 80.0), (2012, 85.0)]);
        let events = vec![event(2010, 3, 300.0), event(2011, 5, 700.0)];
        let report = CmeAnalysis::annual()
            .bootstrap_iterations(20)
            .correlate(&sunspots, &events, &presets::baseline())
            .unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.skipped.len(), 4);
        assert_eq!(report.skipped[0].label, "Slow");
    }

    #[test]
    fn test_granularity_mismatch_is_rejected() {
        let sunspots = annual_sunspots(&[(2009, 3.0)]);
        let err = CmeAnalysis::monthly()
            .correlate(&sunspots, &[], &presets::baseline())
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Configuration(ConfigError::InvalidParameter { name: "granularity", .. })
        ));
    }

    #[test]
    fn test_period_filters_both_inputs() {
        let sunspots = annual_sunspots(&[(2008, 5.0), (2009, 10.0), (2010, 15.0), (2011, 55.0)]);
        let events = vec![event(2008, 1, 400.0), event(2009, 1, 400.0), event(2011, 1, 400.0)];
        let period = AnalysisPeriod::new(
            NaiveDate::from_ymd_opt(2009, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2011, 12, 31).unwrap(),
        );
        let report = CmeAnalysis::annual()
            .period(period)
            .min_sample_size(3)
            .correlate(&sunspots, &events, &presets::baseline())
            .unwrap();
        // Only 2009 and 2011 have Slow events inside the period.
        assert_eq!(report.skipped[0].n_periods, 2);
        assert_eq!(report.period, Some(period));
    }

    #[test]
    fn test_invalid_config_fails_before_work() {
        let err = CmeAnalysis::annual()
            .bootstrap_iterations(0)
            .normality(&TimeSeries::default(), &[])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
    }
}
