//! CPU vs accelerator comparison rows.

use crate::backend::{Device, format_params};
use crate::catalog::{QueryLength, size_rank};
use crate::timing::{LatencyStats, TimingResult};
use std::collections::HashMap;

/// One (model, size, query) identity with CPU statistics and the optional
/// accelerator counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub model_id: String,
    pub size_label: String,
    pub query_length: QueryLength,
    pub cpu: LatencyStats,
    pub gpu: Option<LatencyStats>,
    pub embedding_dim: Option<u64>,
    pub num_parameters: Option<u64>,
    pub max_seq_length: Option<u64>,
    pub model_type: Option<String>,
    pub cpu_load_time_ms: Option<f64>,
    pub gpu_load_time_ms: Option<f64>,
}

impl ComparisonRow {
    pub fn gpu_mean_ms(&self) -> Option<f64> {
        self.gpu.map(|g| g.mean_ms)
    }

    /// `cpu_mean / gpu_mean` when an accelerator mean exists and is positive.
    pub fn speedup(&self) -> Option<f64> {
        speedup(self.cpu.mean_ms, self.gpu_mean_ms())
    }

    pub fn params_str(&self) -> Option<String> {
        self.num_parameters.map(format_params)
    }

    fn sort_key(&self) -> (u32, u32, &str, &str) {
        (
            size_rank(&self.size_label),
            self.query_length.rank(),
            &self.size_label,
            &self.model_id,
        )
    }
}

/// Ratio of a CPU mean to an accelerator mean, undefined unless the latter is
/// strictly positive.
pub fn speedup(cpu_mean_ms: f64, gpu_mean_ms: Option<f64>) -> Option<f64> {
    gpu_mean_ms
        .filter(|g| *g > 0.0)
        .map(|g| cpu_mean_ms / g)
}

type RowKey<'a> = (&'a str, &'a str, QueryLength);

fn key(result: &TimingResult) -> RowKey<'_> {
    (&result.model_id, &result.size_label, result.query_length)
}

/// Pair CPU results with their accelerator counterparts.
///
/// Produces one row per distinct CPU identity (a later duplicate replaces an
/// earlier one), sorted by size rank, then query rank. Size label and model
/// id break remaining ties so the order is total.
pub fn build_comparison_rows(results: &[TimingResult]) -> Vec<ComparisonRow> {
    let mut cpu: HashMap<RowKey<'_>, &TimingResult> = HashMap::new();
    let mut gpu: HashMap<RowKey<'_>, &TimingResult> = HashMap::new();
    for r in results {
        match r.device {
            Device::Cpu => cpu.insert(key(r), r),
            Device::Cuda => gpu.insert(key(r), r),
        };
    }

    let mut rows: Vec<ComparisonRow> = cpu
        .into_iter()
        .map(|(k, cpu_r)| {
            let gpu_r = gpu.get(&k).copied();
            let info = cpu_r.model_info.as_ref();
            ComparisonRow {
                model_id: cpu_r.model_id.clone(),
                size_label: cpu_r.size_label.clone(),
                query_length: cpu_r.query_length,
                cpu: cpu_r.stats(),
                gpu: gpu_r.map(TimingResult::stats),
                embedding_dim: info.and_then(|i| i.embedding_dim),
                num_parameters: info.and_then(|i| i.num_parameters),
                max_seq_length: info.and_then(|i| i.max_seq_length),
                model_type: info.and_then(|i| i.model_type.clone()),
                cpu_load_time_ms: cpu_r.load_time_ms,
                gpu_load_time_ms: gpu_r.and_then(|g| g.load_time_ms),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    rows
}
