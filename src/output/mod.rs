//! Output formatting for analysis reports.

mod export;
mod json;
mod terminal;

pub use export::{write_correlations_csv, write_sensitivity_csv};
pub use json::{to_json, to_json_pretty};
pub use terminal::{format_correlation, format_normality, format_sensitivity};
