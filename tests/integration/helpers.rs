//! Shared helpers for integration tests.
//!
//! `ScriptedBackend` stands in for ONNX Runtime: it loads instantly, returns
//! fixed-width vectors, and can be told to fail specific units.

use embed_bench::backend::{Device, EmbeddingBackend, EmbeddingHandle, ModelInfo};
use embed_bench::catalog::{CatalogEntry, ModelCatalog, QueryLength};
use embed_bench::config::{BenchConfig, DevicePolicy, OutputFormat, RunMode, RunSettings};
use embed_bench::hardware::HardwareInfo;
use embed_bench::results::BenchmarkResults;
use embed_bench::timing::TimingResult;
use embed_bench::{BenchError, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub(crate) const DIM: usize = 8;

/// How a scripted unit should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    Load,
    /// Fail the n-th `embed` call (1-based, warmup included).
    EmbedCall(usize),
}

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    pub accelerator: bool,
    failures: Vec<(String, Option<Device>, Failure)>,
    pub loads: RefCell<Vec<(String, Device)>>,
    pub live_handles: Rc<Cell<usize>>,
}

impl ScriptedBackend {
    pub(crate) fn cpu_only() -> Self {
        Self::default()
    }

    pub(crate) fn with_accelerator() -> Self {
        Self {
            accelerator: true,
            ..Self::default()
        }
    }

    /// Fail `model_id` on `device` (or on every device when `None`).
    pub(crate) fn failing(mut self, model_id: &str, device: Option<Device>, failure: Failure) -> Self {
        self.failures.push((model_id.to_owned(), device, failure));
        self
    }

    fn failure_for(&self, model_id: &str, device: Device) -> Option<Failure> {
        self.failures
            .iter()
            .find(|(m, d, _)| m == model_id && d.is_none_or(|d| d == device))
            .map(|(_, _, f)| *f)
    }
}

pub(crate) struct ScriptedHandle {
    fail_at: Option<usize>,
    calls: usize,
    live: Rc<Cell<usize>>,
}

impl EmbeddingHandle for ScriptedHandle {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        self.calls += 1;
        if self.fail_at == Some(self.calls) {
            return Err(BenchError::Inference("CUDA out of memory".to_owned()));
        }
        Ok(vec![text.len() as f32; DIM])
    }

    fn synchronize(&mut self) -> Result<()> {
        Ok(())
    }
}

impl Drop for ScriptedHandle {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

impl EmbeddingBackend for ScriptedBackend {
    type Handle = ScriptedHandle;

    fn accelerator_available(&self) -> bool {
        self.accelerator
    }

    fn load(&self, entry: &CatalogEntry, device: Device) -> Result<ScriptedHandle> {
        self.loads.borrow_mut().push((entry.model_id.clone(), device));
        let fail_at = match self.failure_for(&entry.model_id, device) {
            Some(Failure::Load) => {
                return Err(BenchError::Model(format!("{} not found on the Hub", entry.model_id)));
            }
            Some(Failure::EmbedCall(n)) => Some(n),
            None => None,
        };
        self.live_handles.set(self.live_handles.get() + 1);
        Ok(ScriptedHandle {
            fail_at,
            calls: 0,
            live: Rc::clone(&self.live_handles),
        })
    }

    fn describe(&self, entry: &CatalogEntry, _handle: &ScriptedHandle) -> ModelInfo {
        ModelInfo {
            embedding_dim: Some(DIM as u64),
            max_seq_length: Some(512),
            num_parameters: Some(22_713_216),
            model_type: Some("bert".to_owned()),
            ..ModelInfo::unknown(entry)
        }
    }
}

/// Two dense models, quick-mode size labels.
pub(crate) fn two_dense_catalog() -> ModelCatalog {
    ModelCatalog::from_entries(vec![
        CatalogEntry::dense("small", "test/mini-a"),
        CatalogEntry::dense("medium", "test/base-b"),
    ])
}

pub(crate) fn config(iterations: u64, warmup: u64) -> BenchConfig {
    BenchConfig {
        iterations: Some(iterations),
        warmup: Some(warmup),
        formats: vec![OutputFormat::Json, OutputFormat::Csv, OutputFormat::Md],
        ..BenchConfig::default()
    }
}

pub(crate) fn cpu_only_config(iterations: u64, warmup: u64) -> BenchConfig {
    BenchConfig {
        devices: DevicePolicy::CpuOnly,
        ..config(iterations, warmup)
    }
}

/// A result with explicit samples, for report tests that bypass timing.
pub(crate) fn timing(
    model_id: &str,
    size: &str,
    query: QueryLength,
    device: Device,
    samples: &[f64],
) -> TimingResult {
    let mut r = TimingResult::new(model_id, size, query, device);
    for s in samples {
        r.push_sample(*s);
    }
    r
}

pub(crate) fn empty_results(gpu_available: bool) -> BenchmarkResults {
    let settings = RunSettings {
        iterations: 5,
        warmup: 1,
        mode: RunMode::Quick,
        dry_run: false,
    };
    BenchmarkResults::new(settings, gpu_available, HardwareInfo::default())
}
