//! Structured JSON report. Unknown values serialize as `null`.

use super::ReportDataset;
use crate::aggregate::GroupStats;
use crate::compare::ComparisonRow;
use crate::config::RunMode;
use crate::error::{BenchError, Result};
use crate::hardware::HardwareInfo;
use serde::Serialize;

#[derive(Serialize)]
struct Document<'a> {
    run_timestamp: String,
    total_runtime_seconds: f64,
    hardware: HardwareRecord<'a>,
    config: ConfigRecord,
    comparison: Vec<ComparisonRecord<'a>>,
    aggregations_by_query_size: Vec<QueryAggRecord<'a>>,
    aggregations_by_model_size: Vec<SizeAggRecord<'a>>,
}

#[derive(Serialize)]
struct HardwareRecord<'a> {
    cpu_model: Option<&'a str>,
    cpu_cores: Option<usize>,
    cpu_threads: Option<usize>,
    ram_gb: Option<f64>,
    gpu_model: Option<&'a str>,
    gpu_memory_gb: Option<f64>,
    gpu_driver_version: Option<&'a str>,
    cuda_version: Option<&'a str>,
    runtime_version: Option<&'a str>,
}

impl<'a> From<&'a HardwareInfo> for HardwareRecord<'a> {
    fn from(hw: &'a HardwareInfo) -> Self {
        Self {
            cpu_model: hw.cpu_model.as_deref(),
            cpu_cores: hw.cpu_cores,
            cpu_threads: hw.cpu_threads,
            ram_gb: hw.ram_gb.map(round1),
            gpu_model: hw.gpu_model.as_deref(),
            gpu_memory_gb: hw.gpu_memory_gb.map(round1),
            gpu_driver_version: hw.gpu_driver_version.as_deref(),
            cuda_version: hw.cuda_version.as_deref(),
            runtime_version: hw.runtime_version.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ConfigRecord {
    iterations: u64,
    warmup: u64,
    gpu_available: bool,
    mode: RunMode,
    dry_run: bool,
}

#[derive(Serialize)]
struct ComparisonRecord<'a> {
    model: &'a str,
    size: &'a str,
    params: Option<u64>,
    params_str: Option<String>,
    embedding_dim: Option<u64>,
    max_seq_length: Option<u64>,
    model_type: Option<&'a str>,
    cpu_load_time_ms: Option<f64>,
    gpu_load_time_ms: Option<f64>,
    query_length: &'static str,
    cpu_mean_ms: f64,
    cpu_p50_ms: f64,
    cpu_p95_ms: f64,
    cpu_p99_ms: f64,
    gpu_mean_ms: Option<f64>,
    gpu_p50_ms: Option<f64>,
    gpu_p95_ms: Option<f64>,
    gpu_p99_ms: Option<f64>,
    speedup: Option<f64>,
}

impl<'a> From<&'a ComparisonRow> for ComparisonRecord<'a> {
    fn from(row: &'a ComparisonRow) -> Self {
        Self {
            model: &row.model_id,
            size: &row.size_label,
            params: row.num_parameters,
            params_str: row.params_str(),
            embedding_dim: row.embedding_dim,
            max_seq_length: row.max_seq_length,
            model_type: row.model_type.as_deref(),
            cpu_load_time_ms: row.cpu_load_time_ms,
            gpu_load_time_ms: row.gpu_load_time_ms,
            query_length: row.query_length.label(),
            cpu_mean_ms: row.cpu.mean_ms,
            cpu_p50_ms: row.cpu.p50_ms,
            cpu_p95_ms: row.cpu.p95_ms,
            cpu_p99_ms: row.cpu.p99_ms,
            gpu_mean_ms: row.gpu.map(|g| g.mean_ms),
            gpu_p50_ms: row.gpu.map(|g| g.p50_ms),
            gpu_p95_ms: row.gpu.map(|g| g.p95_ms),
            gpu_p99_ms: row.gpu.map(|g| g.p99_ms),
            speedup: row.speedup(),
        }
    }
}

#[derive(Serialize)]
struct GroupRecord {
    cpu_mean_ms: f64,
    cpu_p50_ms: f64,
    cpu_p95_ms: f64,
    gpu_mean_ms: Option<f64>,
    gpu_p50_ms: Option<f64>,
    gpu_p95_ms: Option<f64>,
    avg_speedup: Option<f64>,
}

impl From<&GroupStats> for GroupRecord {
    fn from(s: &GroupStats) -> Self {
        Self {
            cpu_mean_ms: s.cpu_mean_ms,
            cpu_p50_ms: s.cpu_p50_ms,
            cpu_p95_ms: s.cpu_p95_ms,
            gpu_mean_ms: s.gpu_mean_ms,
            gpu_p50_ms: s.gpu_p50_ms,
            gpu_p95_ms: s.gpu_p95_ms,
            avg_speedup: s.speedup(),
        }
    }
}

#[derive(Serialize)]
struct QueryAggRecord<'a> {
    query_length: &'a str,
    #[serde(flatten)]
    stats: GroupRecord,
}

#[derive(Serialize)]
struct SizeAggRecord<'a> {
    model_size: &'a str,
    #[serde(flatten)]
    stats: GroupRecord,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Render the dataset as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`BenchError::Report`] if serialization fails.
pub fn render_json(dataset: &ReportDataset<'_>) -> Result<String> {
    let results = dataset.results;
    let doc = Document {
        run_timestamp: results.started_at.to_rfc3339(),
        total_runtime_seconds: round1(results.total_runtime_seconds),
        hardware: HardwareRecord::from(&results.hardware),
        config: ConfigRecord {
            iterations: results.settings.iterations,
            warmup: results.settings.warmup,
            gpu_available: results.gpu_available,
            mode: results.settings.mode,
            dry_run: results.settings.dry_run,
        },
        comparison: dataset.rows.iter().map(ComparisonRecord::from).collect(),
        aggregations_by_query_size: dataset
            .by_query
            .iter()
            .map(|agg| QueryAggRecord {
                query_length: agg.query_length.label(),
                stats: GroupRecord::from(&agg.stats),
            })
            .collect(),
        aggregations_by_model_size: dataset
            .by_size
            .iter()
            .map(|agg| SizeAggRecord {
                model_size: &agg.model_size,
                stats: GroupRecord::from(&agg.stats),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&doc).map_err(|e| BenchError::Report(format!("JSON encode failed: {e}")))
}
