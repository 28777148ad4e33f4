//! Raw batched embedding throughput.
//!
//! Unlike the latency benchmark this measures sustained embeddings/second
//! over a large synthetic corpus, one batch at a time.

use crate::backend::EmbeddingHandle;
use crate::error::{BenchError, Result};
use std::time::{Duration, Instant};
use tracing::info;

/// Upper bound on the untimed warmup batch.
pub const MAX_WARMUP_TEXTS: usize = 100;

/// Batches between progress log lines.
const LOG_EVERY_BATCHES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputReport {
    pub num_texts: usize,
    pub batch_size: usize,
    pub batches: usize,
    pub duration: Duration,
    /// Embedding vector width, `None` when nothing was embedded.
    pub embedding_dim: Option<usize>,
}

impl ThroughputReport {
    pub fn embeddings_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.num_texts as f64 / secs
        } else {
            0.0
        }
    }

    /// `(rows, columns)` of the stacked output.
    pub fn output_shape(&self) -> (usize, usize) {
        (self.num_texts, self.embedding_dim.unwrap_or(0))
    }
}

/// `count` distinct short documents.
pub fn synthetic_corpus(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("This is test document number {i} for throughput testing with embeddings."))
        .collect()
}

/// Embed `texts` in batches of `batch_size` and time the whole pass.
///
/// One untimed warmup batch of at most [`MAX_WARMUP_TEXTS`] texts runs first,
/// followed by a synchronization barrier. The timed region ends with another
/// barrier.
///
/// # Errors
///
/// Returns [`BenchError::Config`] for a zero batch size, or the backend error
/// of the first failing batch.
pub fn run_batched<H: EmbeddingHandle>(
    handle: &mut H,
    texts: &[String],
    batch_size: usize,
) -> Result<ThroughputReport> {
    if batch_size == 0 {
        return Err(BenchError::Config("batch size must be greater than zero".to_owned()));
    }

    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let warmup = refs.len().min(batch_size).min(MAX_WARMUP_TEXTS);
    if warmup > 0 {
        handle.embed_batch(&refs[..warmup])?;
    }
    handle.synchronize()?;

    let total_batches = refs.len().div_ceil(batch_size);
    let mut embedding_dim = None;
    let mut embedded = 0_usize;
    let start = Instant::now();
    for (i, batch) in refs.chunks(batch_size).enumerate() {
        let vectors = handle.embed_batch(batch)?;
        if vectors.len() != batch.len() {
            return Err(BenchError::Inference(format!(
                "batch {} returned {} embeddings for {} texts",
                i + 1,
                vectors.len(),
                batch.len()
            )));
        }
        if embedding_dim.is_none() {
            embedding_dim = vectors.first().map(Vec::len);
        }
        embedded += batch.len();

        let batch_num = i + 1;
        if batch_num % LOG_EVERY_BATCHES == 0 || batch_num == total_batches {
            let rate = embedded as f64 / start.elapsed().as_secs_f64().max(f64::EPSILON);
            info!(
                "batch {batch_num}/{total_batches}: {embedded}/{} texts ({rate:.0} emb/sec)",
                refs.len()
            );
        }
    }
    handle.synchronize()?;

    Ok(ThroughputReport {
        num_texts: refs.len(),
        batch_size,
        batches: total_batches,
        duration: start.elapsed(),
        embedding_dim,
    })
}
