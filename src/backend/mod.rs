//! Embedding backend contract.
//!
//! The benchmark never touches model internals directly. A backend turns a
//! [`CatalogEntry`] plus a [`Device`] into an [`EmbeddingHandle`] that can
//! embed one text, wait for outstanding device work, and describe itself.
//! Dropping the handle releases the model and any device-side memory.

pub mod metadata;
pub mod onnx;

use crate::catalog::CatalogEntry;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use self::onnx::OrtBackend;

/// Execution device for a benchmark unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    /// NVIDIA GPU through the CUDA execution provider.
    Cuda,
}

impl Device {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
        }
    }

    pub fn is_accelerator(self) -> bool {
        !matches!(self, Self::Cpu)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model metadata gathered from backend introspection. Every field except the
/// identity may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub size_label: String,
    pub embedding_dim: Option<u64>,
    pub max_seq_length: Option<u64>,
    pub num_parameters: Option<u64>,
    pub model_type: Option<String>,
    pub is_sparse: bool,
}

impl ModelInfo {
    /// Metadata with only the identity known.
    pub fn unknown(entry: &CatalogEntry) -> Self {
        Self {
            model_id: entry.model_id.clone(),
            size_label: entry.size_label.clone(),
            is_sparse: entry.is_sparse(),
            ..Self::default()
        }
    }

    /// Parameter count as `"110M"` / `"1.3B"`, or `None` when unknown.
    pub fn params_str(&self) -> Option<String> {
        self.num_parameters.map(format_params)
    }
}

/// Format a parameter count: billions with one decimal, else whole millions.
pub fn format_params(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1_000_000_000.0)
    } else {
        format!("{:.0}M", n as f64 / 1_000_000.0)
    }
}

/// A loaded, inference-ready model.
pub trait EmbeddingHandle {
    /// Embed one text. Sparse models include their pooling step here.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or inference fails.
    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts in one call, returning one vector per text.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or inference fails.
    fn embed_batch(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Block until every operation queued on the device has completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the device reports a failure while draining.
    fn synchronize(&mut self) -> Result<()>;
}

/// Factory for [`EmbeddingHandle`]s.
pub trait EmbeddingBackend {
    type Handle: EmbeddingHandle;

    /// Whether an accelerator device can be used in this process.
    fn accelerator_available(&self) -> bool;

    /// Load `entry` onto `device`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is unavailable, incompatible, or does
    /// not fit on the device.
    fn load(&self, entry: &CatalogEntry, device: Device) -> Result<Self::Handle>;

    /// Best-effort metadata for a loaded model. Never fails; unknown fields
    /// stay `None`.
    fn describe(&self, entry: &CatalogEntry, handle: &Self::Handle) -> ModelInfo;
}
