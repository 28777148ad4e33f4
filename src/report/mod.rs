//! Report rendering and export.
//!
//! Every renderer reads the same [`ReportDataset`], which derives comparison
//! rows and both aggregations from a [`BenchmarkResults`] exactly once.
//!
//! # Modules
//!
//! - `json`: structured export
//! - `csv`: flat one-row-per-comparison export
//! - `markdown`: sectioned narrative report
//! - `console`: plain-text tables for the terminal

pub mod console;
pub mod csv;
pub mod json;
pub mod markdown;

use crate::aggregate::{self, ModelSizeAggregation, QuerySizeAggregation};
use crate::compare::{self, ComparisonRow};
use crate::config::OutputFormat;
use crate::error::Result;
use crate::results::BenchmarkResults;
use std::path::{Path, PathBuf};
use tracing::info;

pub use self::console::render_console;
pub use self::csv::render_csv;
pub use self::json::render_json;
pub use self::markdown::render_markdown;

/// Derived, read-only view over one run's results.
#[derive(Debug)]
pub struct ReportDataset<'a> {
    pub results: &'a BenchmarkResults,
    pub rows: Vec<ComparisonRow>,
    pub by_query: Vec<QuerySizeAggregation>,
    pub by_size: Vec<ModelSizeAggregation>,
}

impl<'a> ReportDataset<'a> {
    pub fn build(results: &'a BenchmarkResults) -> Self {
        let rows = compare::build_comparison_rows(results.results());
        let by_query = aggregate::by_query_length(&rows);
        let by_size = aggregate::by_model_size(&rows);
        Self {
            results,
            rows,
            by_query,
            by_size,
        }
    }

    /// Comparison rows with repeated model ids removed; first occurrence wins.
    pub fn distinct_models(&self) -> Vec<&ComparisonRow> {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.model_id.as_str()))
            .collect()
    }
}

/// Render `format` to a string.
///
/// # Errors
///
/// Returns [`crate::error::BenchError::Report`] if serialization fails.
pub fn render(dataset: &ReportDataset<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(dataset),
        OutputFormat::Csv => render_csv(dataset),
        OutputFormat::Md => Ok(render_markdown(dataset)),
    }
}

/// Write one artifact per format into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns an error if rendering fails or a file cannot be written.
pub fn export(
    dataset: &ReportDataset<'_>,
    formats: &[OutputFormat],
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = dir.join(format.file_name());
        std::fs::write(&path, render(dataset, format)?)?;
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// `org/model-name` → `model-name`.
pub(crate) fn short_model_name(model_id: &str) -> &str {
    model_id.rsplit('/').next().unwrap_or(model_id)
}

/// `1.2s` at or above one second, else whole milliseconds.
pub(crate) fn load_time_str(load_ms: Option<f64>) -> String {
    match load_ms {
        None => "?".to_owned(),
        Some(ms) if ms >= 1000.0 => format!("{:.1}s", ms / 1000.0),
        Some(ms) => format!("{ms:.0}ms"),
    }
}

/// `3m 12.4s`, or `12.4s` under a minute.
pub fn runtime_str(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor();
    let rest = seconds - minutes * 60.0;
    if minutes > 0.0 {
        format!("{minutes:.0}m {rest:.1}s")
    } else {
        format!("{rest:.1}s")
    }
}

/// Display an optional value, `?` when unknown.
pub(crate) fn or_unknown<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "?".to_owned(), |v| v.to_string())
}

/// Two-decimal milliseconds, `N/A` when absent.
pub(crate) fn ms_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |v| format!("{v:.2}"))
}

pub(crate) fn speedup_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |v| format!("{v:.1}x"))
}
