//! Root result set for one benchmark run.

use crate::config::RunSettings;
use crate::hardware::HardwareInfo;
use crate::timing::TimingResult;
use chrono::{DateTime, Utc};

/// Every [`TimingResult`] of a run plus the context needed to report it.
///
/// Results are append-only; comparison rows and aggregations are derived from
/// this on demand.
#[derive(Debug, Clone)]
pub struct BenchmarkResults {
    results: Vec<TimingResult>,
    pub settings: RunSettings,
    pub gpu_available: bool,
    pub hardware: HardwareInfo,
    pub started_at: DateTime<Utc>,
    pub total_runtime_seconds: f64,
}

impl BenchmarkResults {
    pub fn new(settings: RunSettings, gpu_available: bool, hardware: HardwareInfo) -> Self {
        Self {
            results: Vec::new(),
            settings,
            gpu_available,
            hardware,
            started_at: Utc::now(),
            total_runtime_seconds: 0.0,
        }
    }

    pub fn add(&mut self, result: TimingResult) {
        self.results.push(result);
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = TimingResult>) {
        self.results.extend(results);
    }

    pub fn results(&self) -> &[TimingResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
