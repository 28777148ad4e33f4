//! Group summaries over comparison rows.
//!
//! Each group statistic is the mean of the member rows' own statistic, not a
//! quantile over the pooled samples. Speedup is recomputed from the group's
//! aggregated means.

use crate::catalog::{QueryLength, SIZE_RANKS};
use crate::compare::{ComparisonRow, speedup};
use crate::timing::{LatencyStats, mean};

/// Mean-of-means statistics for one group of rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStats {
    pub cpu_mean_ms: f64,
    pub cpu_p50_ms: f64,
    pub cpu_p95_ms: f64,
    pub gpu_mean_ms: Option<f64>,
    pub gpu_p50_ms: Option<f64>,
    pub gpu_p95_ms: Option<f64>,
}

impl GroupStats {
    /// Summarize `rows`. Accelerator fields average only the rows that have
    /// accelerator data and are `None` when no row does.
    pub fn from_rows(rows: &[&ComparisonRow]) -> Self {
        let cpu = |f: fn(&ComparisonRow) -> f64| mean(&rows.iter().map(|r| f(r)).collect::<Vec<_>>());
        let gpu_rows: Vec<_> = rows.iter().filter_map(|r| r.gpu).collect();
        let gpu = |f: fn(&LatencyStats) -> f64| {
            if gpu_rows.is_empty() {
                None
            } else {
                Some(mean(&gpu_rows.iter().map(f).collect::<Vec<_>>()))
            }
        };

        Self {
            cpu_mean_ms: cpu(|r| r.cpu.mean_ms),
            cpu_p50_ms: cpu(|r| r.cpu.p50_ms),
            cpu_p95_ms: cpu(|r| r.cpu.p95_ms),
            gpu_mean_ms: gpu(|s| s.mean_ms),
            gpu_p50_ms: gpu(|s| s.p50_ms),
            gpu_p95_ms: gpu(|s| s.p95_ms),
        }
    }

    pub fn speedup(&self) -> Option<f64> {
        speedup(self.cpu_mean_ms, self.gpu_mean_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySizeAggregation {
    pub query_length: QueryLength,
    pub stats: GroupStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSizeAggregation {
    pub model_size: String,
    pub stats: GroupStats,
}

/// One summary per query length present, in short/medium/long order.
pub fn by_query_length(rows: &[ComparisonRow]) -> Vec<QuerySizeAggregation> {
    QueryLength::ALL
        .into_iter()
        .filter_map(|query| {
            let group: Vec<_> = rows.iter().filter(|r| r.query_length == query).collect();
            (!group.is_empty()).then(|| QuerySizeAggregation {
                query_length: query,
                stats: GroupStats::from_rows(&group),
            })
        })
        .collect()
}

/// One summary per size label present, in rank-table order. Labels missing
/// from the rank table are kept, not dropped, and follow in alphabetical
/// order after every known label.
pub fn by_model_size(rows: &[ComparisonRow]) -> Vec<ModelSizeAggregation> {
    let mut unknown: Vec<&str> = rows
        .iter()
        .map(|r| r.size_label.as_str())
        .filter(|label| !SIZE_RANKS.iter().any(|(known, _)| known == label))
        .collect();
    unknown.sort_unstable();
    unknown.dedup();

    SIZE_RANKS
        .iter()
        .map(|(label, _)| *label)
        .chain(unknown)
        .filter_map(|label| {
            let group: Vec<_> = rows.iter().filter(|r| r.size_label == label).collect();
            (!group.is_empty()).then(|| ModelSizeAggregation {
                model_size: label.to_owned(),
                stats: GroupStats::from_rows(&group),
            })
        })
        .collect()
}
