//! embed-bench: CPU vs GPU latency benchmark for text embedding models.
//!
//! Each model in a fixed catalog is loaded once per device, warmed up, and
//! timed over three query lengths. Results are paired into CPU/GPU
//! comparison rows, summarized per query length and per model size, and
//! exported as JSON, CSV and Markdown.
//!
//! # Architecture
//!
//! ```text
//! BenchmarkOrchestrator
//!   → ModelCatalog          what to run
//!   → HardwareInfo::detect  run context
//!   → EmbeddingRunner       load → warmup → timed loop → cleanup, per unit
//!   → ReportDataset         comparison rows + aggregations
//!   → report::export        json / csv / md
//! ```
//!
//! Models run through the [`backend::EmbeddingBackend`] contract; the
//! shipped implementation is [`backend::OrtBackend`] (ONNX Runtime).

pub mod aggregate;
pub mod backend;
pub mod bench_dirs;
pub mod catalog;
pub mod compare;
pub mod config;
pub mod error;
pub mod hardware;
pub mod orchestrator;
pub mod report;
pub mod results;
pub mod runner;
pub mod throughput;
pub mod timing;

pub use backend::{Device, EmbeddingBackend, EmbeddingHandle, ModelInfo, OrtBackend};
pub use catalog::{CatalogEntry, ModelCatalog, QueryLength};
pub use config::{BenchConfig, OutputFormat, RunMode};
pub use error::{BenchError, Result};
pub use orchestrator::BenchmarkOrchestrator;
pub use report::ReportDataset;
pub use results::BenchmarkResults;
pub use runner::{EmbeddingRunner, UnitFailure, UnitStage};
pub use timing::TimingResult;
