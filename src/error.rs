//! Error types for the analysis core and ingestion.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::CalendarKey;

/// Errors surfaced by the analysis core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Fewer observations than the operation requires.
    ///
    /// Recoverable: callers skip the bin or scheme and continue.
    #[error("insufficient data: {available} observations available, {required} required")]
    InsufficientData {
        /// Minimum number of observations required.
        required: usize,
        /// Number of observations available.
        available: usize,
    },

    /// One coordinate of the sample has zero variance, so the rank
    /// correlation is undefined.
    #[error("degenerate sample: {coordinate} has zero variance")]
    DegenerateSample {
        /// Which coordinate is constant (`"x"` or `"y"`).
        coordinate: &'static str,
    },

    /// Invalid bin scheme or analysis parameter.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl AnalysisError {
    /// Whether the failure only means "not enough usable data" for this unit
    /// of work, as opposed to a configuration problem.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientData { .. } | AnalysisError::DegenerateSample { .. }
        )
    }
}

/// Structural configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A scheme without bins.
    #[error("bin scheme has no bins")]
    EmptyScheme,

    /// A bin bound is NaN or infinite.
    #[error("bin '{label}' has a non-finite bound")]
    NonFiniteBound {
        /// Offending bin label.
        label: String,
    },

    /// A bin with `vmin > vmax`.
    #[error("bin '{label}' is inverted: vmin {vmin} > vmax {vmax}")]
    InvertedBin {
        /// Offending bin label.
        label: String,
        /// Lower bound.
        vmin: f64,
        /// Upper bound.
        vmax: f64,
    },

    /// Consecutive bins overlap or are out of order.
    #[error("bins '{first}' and '{second}' overlap or are out of order")]
    OverlappingBins {
        /// Earlier bin label.
        first: String,
        /// Later bin label.
        second: String,
    },

    /// Two bins in one scheme share a label.
    #[error("duplicate bin label '{0}'")]
    DuplicateLabel(String),

    /// A series contains the same calendar key twice.
    #[error("duplicate calendar key {0} in series")]
    DuplicateKey(CalendarKey),

    /// Paired sequences of unequal length.
    #[error("aligned sequences differ in length: {keys} keys, {x} x values, {y} y values")]
    LengthMismatch {
        /// Number of keys.
        keys: usize,
        /// Number of x values.
        x: usize,
        /// Number of y values.
        y: usize,
    },

    /// A numeric parameter is out of range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors while loading sunspot or CME input files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Reading from an in-memory or caller-supplied reader failed.
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    /// The CSV reader failed structurally (not a single bad row).
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the CSV header.
    #[error("column '{0}' not found in CSV header")]
    MissingColumn(String),

    /// The sunspot file contained no usable rows.
    #[error("no usable rows in sunspot input")]
    Empty,

    /// The rows parsed into a series with duplicate keys.
    #[error(transparent)]
    Series(#[from] ConfigError),
}

/// Convenience alias for analysis results.
pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
