use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::info;

use sunspot_cme::ingest::{self, CatalogColumns};
use sunspot_cme::output;
use sunspot_cme::{
    presets, AnalysisPeriod, BinScheme, CmeAnalysis, Config, Granularity, NamedScheme, SkewnessForm,
    TimeSeries,
};

#[derive(Parser)]
#[command(name = "sunspot-cme")]
#[command(about = "Correlate sunspot number with CME rates by CME speed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spearman correlation per velocity bin with bootstrap intervals
    Correlate {
        #[command(flatten)]
        common: CommonArgs,
        /// JSON bin scheme (defaults to the built-in baseline)
        #[arg(long)]
        scheme: Option<PathBuf>,
        /// Bootstrap resamples
        #[arg(long)]
        iterations: Option<usize>,
        /// Base seed for bootstrap resampling
        #[arg(long)]
        seed: Option<u64>,
        /// Also write results to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Henze-Zirkler and Mardia normality tests on sunspot number vs CME counts
    Normality {
        #[command(flatten)]
        common: CommonArgs,
        /// Pair kernel for Mardia skewness
        #[arg(long, value_enum)]
        skewness: Option<SkewnessArg>,
    },
    /// Sensitivity of per-bin correlations to bin boundaries
    Sensitivity {
        #[command(flatten)]
        common: CommonArgs,
        /// JSON file with `baseline` and `variants` (defaults to the built-in presets)
        #[arg(long)]
        schemes: Option<PathBuf>,
        /// Also write summaries to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// SILSO sunspot number file (annual or monthly, matching --granularity)
    #[arg(long)]
    sunspots: PathBuf,
    /// CME catalog CSV
    #[arg(long)]
    cmes: PathBuf,
    /// Join granularity
    #[arg(short, long, value_enum)]
    granularity: Option<GranularityArg>,
    /// First day of the analysis period (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day of the analysis period (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// JSON configuration file; command-line options override it
    #[arg(short, long, env = "SUNSPOT_CME_CONFIG")]
    config: Option<PathBuf>,
    /// Timestamp column in the CME catalog
    #[arg(long, default_value = "Fecha")]
    timestamp_column: String,
    /// Speed column in the CME catalog
    #[arg(long, default_value = "Rapidez")]
    speed_column: String,
    /// Print JSON instead of the terminal report
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum GranularityArg {
    Annual,
    Monthly,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Annual => Granularity::Year,
            GranularityArg::Monthly => Granularity::YearMonth,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SkewnessArg {
    PairwiseDistance,
    CrossProduct,
}

impl From<SkewnessArg> for SkewnessForm {
    fn from(arg: SkewnessArg) -> Self {
        match arg {
            SkewnessArg::PairwiseDistance => SkewnessForm::PairwiseDistance,
            SkewnessArg::CrossProduct => SkewnessForm::CrossProduct,
        }
    }
}

#[derive(Deserialize)]
struct SchemeSet {
    baseline: BinScheme,
    #[serde(default)]
    variants: Vec<NamedScheme>,
}

/// Inputs shared by every subcommand, resolved from files and flags.
struct Inputs {
    config: Config,
    sunspots: TimeSeries,
    events: Vec<sunspot_cme::CmeEvent>,
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Correlate {
            common,
            scheme,
            iterations,
            seed,
            csv,
        } => {
            let mut inputs = load_inputs(&common)?;
            if let Some(n) = iterations {
                inputs.config.bootstrap_iterations = n;
            }
            if let Some(seed) = seed {
                inputs.config.seed = seed;
            }
            let scheme = match scheme {
                Some(path) => read_json::<BinScheme>(&path)?,
                None => presets::baseline(),
            };

            let report = CmeAnalysis::new(inputs.config)
                .correlate(&inputs.sunspots, &inputs.events, &scheme)
                .context("correlation failed")?;

            if let Some(path) = csv {
                let file = create(&path)?;
                output::write_correlations_csv(file, &report)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "wrote correlation CSV");
            }
            if inputs.json {
                println!("{}", output::to_json_pretty(&report)?);
            } else {
                print!("{}", output::format_correlation(&report));
            }
        }
        Commands::Normality { common, skewness } => {
            let mut inputs = load_inputs(&common)?;
            if let Some(form) = skewness {
                inputs.config.mardia_skewness = form.into();
            }

            let report = CmeAnalysis::new(inputs.config)
                .normality(&inputs.sunspots, &inputs.events)
                .context("normality tests failed")?;

            if inputs.json {
                println!("{}", output::to_json_pretty(&report)?);
            } else {
                print!("{}", output::format_normality(&report));
            }
        }
        Commands::Sensitivity {
            common,
            schemes,
            csv,
        } => {
            let inputs = load_inputs(&common)?;
            let set = match schemes {
                Some(path) => read_json::<SchemeSet>(&path)?,
                None => SchemeSet {
                    baseline: presets::baseline(),
                    variants: presets::variants(),
                },
            };

            let report = CmeAnalysis::new(inputs.config)
                .sensitivity(&inputs.sunspots, &inputs.events, &set.baseline, &set.variants)
                .context("sensitivity analysis failed")?;

            if let Some(path) = csv {
                let file = create(&path)?;
                output::write_sensitivity_csv(file, &report)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "wrote sensitivity CSV");
            }
            if inputs.json {
                println!("{}", output::to_json_pretty(&report)?);
            } else {
                print!("{}", output::format_sensitivity(&report));
            }
        }
    }

    Ok(())
}

fn load_inputs(common: &CommonArgs) -> Result<Inputs> {
    let mut config = match &common.config {
        Some(path) => read_json::<Config>(path)?,
        None => Config::default(),
    };
    if let Some(g) = common.granularity {
        config.granularity = g.into();
    }
    match (common.from, common.to) {
        (Some(start), Some(end)) => config.period = Some(AnalysisPeriod::new(start, end)),
        (None, None) => {}
        _ => anyhow::bail!("--from and --to must be given together"),
    }
    config.validate().context("invalid configuration")?;

    let sunspots = ingest::load_sunspots(&common.sunspots, config.granularity)
        .with_context(|| format!("failed to load sunspots from {}", common.sunspots.display()))?;
    let columns = CatalogColumns {
        timestamp: common.timestamp_column.clone(),
        speed: common.speed_column.clone(),
    };
    let catalog = ingest::load_cme_catalog(&common.cmes, &columns)
        .with_context(|| format!("failed to load CME catalog from {}", common.cmes.display()))?;

    info!(
        granularity = %config.granularity,
        periods = sunspots.len(),
        events = catalog.events.len(),
        skipped_rows = catalog.rows_skipped,
        "inputs loaded"
    );

    Ok(Inputs {
        config,
        sunspots,
        events: catalog.events,
        json: common.json,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}
