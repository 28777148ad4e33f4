//! Per-unit latency samples and the statistics derived from them.
//!
//! The raw sample sequence is the only stored state; every statistic is
//! computed on read so it can never drift from the samples.

use crate::backend::{Device, ModelInfo};
use crate::catalog::QueryLength;
use serde::Serialize;

/// Sample count at which p95 switches from the max fallback to a quantile.
pub const P95_MIN_SAMPLES: usize = 20;

/// Sample count at which p99 switches from the max fallback to a quantile.
pub const P99_MIN_SAMPLES: usize = 100;

/// Latency samples for one (model, size, query, device) unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingResult {
    pub model_id: String,
    pub size_label: String,
    pub query_length: QueryLength,
    pub device: Device,
    /// Per-call latencies in milliseconds, in measurement order.
    samples_ms: Vec<f64>,
    pub model_info: Option<ModelInfo>,
    pub load_time_ms: Option<f64>,
}

impl TimingResult {
    pub fn new(
        model_id: impl Into<String>,
        size_label: impl Into<String>,
        query_length: QueryLength,
        device: Device,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            size_label: size_label.into(),
            query_length,
            device,
            samples_ms: Vec::new(),
            model_info: None,
            load_time_ms: None,
        }
    }

    /// Attach load metadata shared by every query of a loaded model.
    #[must_use]
    pub fn with_load(mut self, model_info: Option<ModelInfo>, load_time_ms: Option<f64>) -> Self {
        self.model_info = model_info;
        self.load_time_ms = load_time_ms;
        self
    }

    /// Append one timed call.
    pub fn push_sample(&mut self, elapsed_ms: f64) {
        self.samples_ms.push(elapsed_ms);
    }

    pub fn samples_ms(&self) -> &[f64] {
        &self.samples_ms
    }

    pub fn sample_count(&self) -> usize {
        self.samples_ms.len()
    }

    pub fn mean_ms(&self) -> f64 {
        mean(&self.samples_ms)
    }

    /// Sample standard deviation; 0 with fewer than two samples.
    pub fn std_ms(&self) -> f64 {
        sample_stdev(&self.samples_ms)
    }

    pub fn p50_ms(&self) -> f64 {
        median(&sorted(&self.samples_ms))
    }

    /// 19th of 20 quantile cut points, or the maximum below 20 samples.
    pub fn p95_ms(&self) -> f64 {
        quantile_or_max(&sorted(&self.samples_ms), 19, 20)
    }

    /// 99th of 100 quantile cut points, or the maximum below 100 samples.
    pub fn p99_ms(&self) -> f64 {
        quantile_or_max(&sorted(&self.samples_ms), 99, 100)
    }

    /// All derived statistics, sorting the samples once.
    pub fn stats(&self) -> LatencyStats {
        let sorted = sorted(&self.samples_ms);
        LatencyStats {
            mean_ms: mean(&self.samples_ms),
            std_ms: sample_stdev(&self.samples_ms),
            p50_ms: median(&sorted),
            p95_ms: quantile_or_max(&sorted, 19, 20),
            p99_ms: quantile_or_max(&sorted, 99, 100),
        }
    }
}

/// Summary statistics for one device's samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub mean_ms: f64,
    pub std_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut v = samples.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Cut point `i` of `parts` equal-probability groups when there are at least
/// `parts` samples, otherwise the largest sample.
fn quantile_or_max(sorted: &[f64], i: usize, parts: usize) -> f64 {
    if sorted.len() >= parts {
        exclusive_quantile(sorted, i, parts)
    } else {
        sorted.last().copied().unwrap_or(0.0)
    }
}

/// Linear interpolation between order statistics at position `i * (n + 1) / parts`
/// (the "exclusive" method). Requires `sorted.len() >= parts` and `0 < i < parts`,
/// which keeps both neighbours in bounds.
fn exclusive_quantile(sorted: &[f64], i: usize, parts: usize) -> f64 {
    let m = sorted.len() + 1;
    let j = i * m / parts;
    let delta = (i * m - j * parts) as f64;
    let parts_f = parts as f64;
    (sorted[j - 1] * (parts_f - delta) + sorted[j] * delta) / parts_f
}
