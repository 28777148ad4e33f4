//! Flat CSV export: one header line, one record per comparison row.

use super::ReportDataset;
use crate::compare::ComparisonRow;
use crate::error::{BenchError, Result};

pub const HEADER: [&str; 17] = [
    "model",
    "size",
    "params",
    "embedding_dim",
    "max_seq_length",
    "cpu_load_time_ms",
    "gpu_load_time_ms",
    "query_length",
    "cpu_mean_ms",
    "cpu_p50_ms",
    "cpu_p95_ms",
    "cpu_p99_ms",
    "gpu_mean_ms",
    "gpu_p50_ms",
    "gpu_p95_ms",
    "gpu_p99_ms",
    "speedup",
];

fn opt<T>(value: Option<T>, fmt: impl Fn(T) -> String) -> String {
    value.map(fmt).unwrap_or_default()
}

fn record(row: &ComparisonRow) -> [String; 17] {
    let ms = |v: f64| format!("{v:.4}");
    let gpu = row.gpu;
    [
        row.model_id.clone(),
        row.size_label.clone(),
        opt(row.num_parameters, |n| n.to_string()),
        opt(row.embedding_dim, |n| n.to_string()),
        opt(row.max_seq_length, |n| n.to_string()),
        opt(row.cpu_load_time_ms, |v| format!("{v:.1}")),
        opt(row.gpu_load_time_ms, |v| format!("{v:.1}")),
        row.query_length.label().to_owned(),
        ms(row.cpu.mean_ms),
        ms(row.cpu.p50_ms),
        ms(row.cpu.p95_ms),
        ms(row.cpu.p99_ms),
        opt(gpu.map(|g| g.mean_ms), ms),
        opt(gpu.map(|g| g.p50_ms), ms),
        opt(gpu.map(|g| g.p95_ms), ms),
        opt(gpu.map(|g| g.p99_ms), ms),
        opt(row.speedup(), |v| format!("{v:.2}")),
    ]
}

/// Render the comparison rows as CSV. Unknown values are empty fields.
///
/// # Errors
///
/// Returns [`BenchError::Report`] if the writer fails.
pub fn render_csv(dataset: &ReportDataset<'_>) -> Result<String> {
    let mut wtr = ::csv::WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(HEADER)
        .map_err(|e| BenchError::Report(format!("failed to write CSV header: {e}")))?;
    for row in &dataset.rows {
        wtr.write_record(record(row))
            .map_err(|e| BenchError::Report(format!("failed to write CSV row for {}: {e}", row.model_id)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| BenchError::Report(format!("failed to flush CSV writer: {e}")))?;
    String::from_utf8(bytes).map_err(|e| BenchError::Report(format!("CSV output is not UTF-8: {e}")))
}
