//! Sequences every benchmark unit of a run.
//!
//! Units run strictly one after another so at most one model is loaded at a
//! time. Devices form the outer loop; within a device, dense models run
//! before sparse ones.

use crate::backend::{Device, EmbeddingBackend};
use crate::catalog::ModelCatalog;
use crate::config::{BenchConfig, DevicePolicy, RunSettings};
use crate::error::Result;
use crate::hardware::HardwareInfo;
use crate::results::BenchmarkResults;
use crate::runner::EmbeddingRunner;
use indicatif::ProgressBar;
use std::time::Instant;
use tracing::{info, warn};

pub struct BenchmarkOrchestrator<'a, B: EmbeddingBackend> {
    backend: &'a B,
    catalog: ModelCatalog,
    settings: RunSettings,
    devices: DevicePolicy,
}

impl<'a, B: EmbeddingBackend> BenchmarkOrchestrator<'a, B> {
    /// Build an orchestrator for `config`, using the catalog its mode selects.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(backend: &'a B, config: &BenchConfig) -> Result<Self> {
        Self::with_catalog(backend, config, config.mode.catalog())
    }

    /// Build an orchestrator over an explicit catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_catalog(backend: &'a B, config: &BenchConfig, catalog: ModelCatalog) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            catalog,
            settings: RunSettings::from(config),
            devices: config.devices,
        })
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Devices a timed run will use.
    pub fn devices(&self) -> Vec<Device> {
        let mut devices = vec![Device::Cpu];
        if self.devices == DevicePolicy::Auto && self.backend.accelerator_available() {
            devices.push(Device::Cuda);
        }
        devices
    }

    /// Total progress units: one per model for a dry run, otherwise one per
    /// timed iteration across every device, model and query.
    pub fn progress_len(&self) -> u64 {
        let models = self.catalog.len() as u64;
        if self.settings.dry_run {
            models
        } else {
            models * self.devices().len() as u64 * self.runner().unit_budget()
        }
    }

    fn runner(&self) -> EmbeddingRunner<'_, B> {
        EmbeddingRunner::new(self.backend, self.settings.iterations, self.settings.warmup)
    }

    /// Run every unit. Failed units are logged and skipped; the run itself
    /// always completes.
    pub fn run(&self, progress: &ProgressBar) -> BenchmarkResults {
        let started = Instant::now();
        let hardware = HardwareInfo::detect();
        let devices = self.devices();
        let gpu_available = devices.iter().any(|d| d.is_accelerator());
        let mut results = BenchmarkResults::new(self.settings, gpu_available, hardware);

        info!(
            "benchmarking {} models ({} mode{}) on {}",
            self.catalog.len(),
            self.settings.mode.as_str(),
            if self.settings.dry_run { ", dry run" } else { "" },
            devices.iter().copied().map(Device::as_str).collect::<Vec<_>>().join(", ")
        );

        if self.settings.dry_run {
            self.run_dry(&mut results, progress);
        } else {
            self.run_timed(&devices, &mut results, progress);
        }

        results.total_runtime_seconds = started.elapsed().as_secs_f64();
        info!(
            "collected {} timing results in {:.1}s",
            results.len(),
            results.total_runtime_seconds
        );
        results
    }

    fn run_dry(&self, results: &mut BenchmarkResults, progress: &ProgressBar) {
        let runner = self.runner();
        for entry in self.catalog.entries() {
            progress.set_message(format!("loading {}", entry.size_label));
            match runner.dry_run_unit(entry) {
                Ok(unit) => results.extend(unit),
                Err(e) => warn!("skipping {e}"),
            }
            progress.inc(1);
        }
    }

    fn run_timed(&self, devices: &[Device], results: &mut BenchmarkResults, progress: &ProgressBar) {
        let runner = self.runner();
        let budget = runner.unit_budget();
        for &device in devices {
            for entry in self.catalog.entries() {
                progress.set_message(format!("{} on {device}", entry.size_label));
                match runner.run_unit(entry, device, progress) {
                    Ok(unit) => results.extend(unit),
                    Err(e) => {
                        warn!("skipping {e}");
                        progress.inc(budget.saturating_sub(e.completed_iterations));
                    }
                }
            }
        }
    }
}
