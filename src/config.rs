//! Benchmark run configuration.
//!
//! Values can come from a TOML file (see [`BenchConfig::from_file`]) and are
//! then overridden by command-line flags. Iteration and warmup counts left
//! unset fall back to per-mode defaults.

use crate::catalog::ModelCatalog;
use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which curated model set to benchmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Five models, many iterations.
    #[default]
    Quick,
    /// The comprehensive model set, fewer iterations.
    Full,
}

impl RunMode {
    pub fn catalog(self) -> ModelCatalog {
        match self {
            Self::Quick => ModelCatalog::quick(),
            Self::Full => ModelCatalog::full(),
        }
    }

    pub fn default_iterations(self) -> u64 {
        match self {
            Self::Quick => 100,
            Self::Full => 10,
        }
    }

    pub fn default_warmup(self) -> u64 {
        match self {
            Self::Quick => 10,
            Self::Full => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Full => "full",
        }
    }
}

/// Report artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Md,
}

impl OutputFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Json => "embed_bench.json",
            Self::Csv => "embed_bench.csv",
            Self::Md => "embed_bench.md",
        }
    }
}

/// Which devices a full run may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DevicePolicy {
    /// CPU, plus the accelerator when the backend reports one.
    #[default]
    Auto,
    CpuOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub mode: RunMode,
    /// Timed iterations per (model, device, query). `None` = mode default.
    pub iterations: Option<u64>,
    /// Untimed warmup calls per (model, device, query). `None` = mode default.
    pub warmup: Option<u64>,
    pub formats: Vec<OutputFormat>,
    /// Load models on the CPU for metadata only; no timing.
    pub dry_run: bool,
    /// Artifact directory. `None` = [`crate::bench_dirs::results_dir`].
    pub output_dir: Option<PathBuf>,
    pub devices: DevicePolicy,
}

impl BenchConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BenchError::Config(e.to_string()))
    }

    pub fn effective_iterations(&self) -> u64 {
        self.iterations.unwrap_or_else(|| self.mode.default_iterations())
    }

    pub fn effective_warmup(&self) -> u64 {
        self.warmup.unwrap_or_else(|| self.mode.default_warmup())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(crate::bench_dirs::results_dir)
    }

    /// Reject settings that would produce an empty sample set.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Config`] when the timed iteration count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.effective_iterations() == 0 {
            return Err(BenchError::Config(
                "iterations must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

/// The run settings recorded alongside results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSettings {
    pub iterations: u64,
    pub warmup: u64,
    pub mode: RunMode,
    pub dry_run: bool,
}

impl From<&BenchConfig> for RunSettings {
    fn from(config: &BenchConfig) -> Self {
        Self {
            iterations: config.effective_iterations(),
            warmup: config.effective_warmup(),
            mode: config.mode,
            dry_run: config.dry_run,
        }
    }
}
