//! Per-unit benchmark execution.
//!
//! A unit is one model on one device. It moves through
//! `Load → Warmup → TimedLoop → Cleanup` for every query length and yields one
//! [`TimingResult`] per query. Any failure aborts only that unit and is
//! reported as a [`UnitFailure`]; the loaded handle is dropped on every exit
//! path.

use crate::backend::{Device, EmbeddingBackend, EmbeddingHandle, ModelInfo};
use crate::catalog::{CatalogEntry, QueryLength};
use crate::error::BenchError;
use crate::timing::TimingResult;
use indicatif::ProgressBar;
use std::fmt;
use std::hint::black_box;
use std::time::Instant;
use tracing::debug;

/// Stage in which a unit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStage {
    Load,
    Warmup,
    Timing,
}

impl fmt::Display for UnitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Warmup => "warmup",
            Self::Timing => "timing",
        })
    }
}

/// A skipped (model, device) unit.
#[derive(Debug, thiserror::Error)]
#[error("{model_id} ({size_label}) on {device} failed during {stage}: {source}")]
pub struct UnitFailure {
    pub model_id: String,
    pub size_label: String,
    pub device: Device,
    pub stage: UnitStage,
    /// Timed iterations already counted toward progress before the failure.
    pub completed_iterations: u64,
    #[source]
    pub source: BenchError,
}

/// Runs units against one backend with fixed iteration counts.
pub struct EmbeddingRunner<'a, B: EmbeddingBackend> {
    backend: &'a B,
    iterations: u64,
    warmup: u64,
}

impl<'a, B: EmbeddingBackend> EmbeddingRunner<'a, B> {
    pub fn new(backend: &'a B, iterations: u64, warmup: u64) -> Self {
        Self {
            backend,
            iterations,
            warmup,
        }
    }

    /// Timed iterations one unit contributes to a progress total.
    pub fn unit_budget(&self) -> u64 {
        self.iterations * QueryLength::ALL.len() as u64
    }

    /// Benchmark `entry` on `device` across every query length.
    ///
    /// `progress` is advanced once per timed iteration.
    ///
    /// # Errors
    ///
    /// Returns a [`UnitFailure`] naming the stage that failed and how many
    /// iterations had already been counted.
    pub fn run_unit(
        &self,
        entry: &CatalogEntry,
        device: Device,
        progress: &ProgressBar,
    ) -> std::result::Result<Vec<TimingResult>, UnitFailure> {
        let mut completed = 0_u64;
        let fail = |stage, completed, source| UnitFailure {
            model_id: entry.model_id.clone(),
            size_label: entry.size_label.clone(),
            device,
            stage,
            completed_iterations: completed,
            source,
        };

        let (mut handle, info, load_time_ms) = self
            .load(entry, device)
            .map_err(|e| fail(UnitStage::Load, 0, e))?;
        debug!("{} loaded on {device} in {load_time_ms:.1}ms", entry.model_id);

        let mut results = Vec::with_capacity(QueryLength::ALL.len());
        for query in QueryLength::ALL {
            let text = query.text();

            for _ in 0..self.warmup {
                black_box(handle.embed(text)).map_err(|e| fail(UnitStage::Warmup, completed, e))?;
            }

            if device.is_accelerator() {
                handle
                    .synchronize()
                    .map_err(|e| fail(UnitStage::Warmup, completed, e))?;
            }

            let mut result = TimingResult::new(&entry.model_id, &entry.size_label, query, device)
                .with_load(Some(info.clone()), Some(load_time_ms));
            for _ in 0..self.iterations {
                let start = Instant::now();
                black_box(handle.embed(text)).map_err(|e| fail(UnitStage::Timing, completed, e))?;
                if device.is_accelerator() {
                    handle
                        .synchronize()
                        .map_err(|e| fail(UnitStage::Timing, completed, e))?;
                }
                result.push_sample(start.elapsed().as_secs_f64() * 1000.0);
                completed += 1;
                progress.inc(1);
            }
            debug!(
                "{} {query} on {device}: mean {:.3}ms over {} samples",
                entry.model_id,
                result.mean_ms(),
                result.sample_count()
            );
            results.push(result);
        }

        drop(handle);
        Ok(results)
    }

    /// Load `entry` on the CPU for its metadata and synthesize one
    /// zero-sample result per query length. No inference is timed.
    ///
    /// # Errors
    ///
    /// Returns a [`UnitFailure`] at [`UnitStage::Load`] if the model cannot
    /// be loaded.
    pub fn dry_run_unit(
        &self,
        entry: &CatalogEntry,
    ) -> std::result::Result<Vec<TimingResult>, UnitFailure> {
        let (handle, info, load_time_ms) =
            self.load(entry, Device::Cpu).map_err(|source| UnitFailure {
                model_id: entry.model_id.clone(),
                size_label: entry.size_label.clone(),
                device: Device::Cpu,
                stage: UnitStage::Load,
                completed_iterations: 0,
                source,
            })?;
        drop(handle);

        Ok(QueryLength::ALL
            .into_iter()
            .map(|query| {
                let mut result =
                    TimingResult::new(&entry.model_id, &entry.size_label, query, Device::Cpu)
                        .with_load(Some(info.clone()), Some(load_time_ms));
                result.push_sample(0.0);
                result
            })
            .collect())
    }

    fn load(
        &self,
        entry: &CatalogEntry,
        device: Device,
    ) -> crate::error::Result<(B::Handle, ModelInfo, f64)> {
        let start = Instant::now();
        let handle = self.backend.load(entry, device)?;
        let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        let info = self.backend.describe(entry, &handle);
        Ok((handle, info, load_time_ms))
    }
}
