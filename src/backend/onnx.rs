//! ONNX Runtime embedding backend.
//!
//! Model files come from HuggingFace Hub (cached by `hf-hub`). Dense models
//! are mean-pooled and L2-normalized; sparse models apply SPLADE pooling to
//! the masked-LM logits.
//!
//! ```text
//! dense:  text → tokenizer → ONNX → mean-pool(mask) → L2-normalize
//! sparse: text → tokenizer → ONNX → max_t(log1p(relu(logits)) · mask)
//! ```

use super::metadata::{self, RawConfig};
use super::{Device, EmbeddingBackend, EmbeddingHandle, ModelInfo};
use crate::catalog::{CatalogEntry, ModelKind};
use crate::error::{BenchError, Result};
use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::{Session, SessionInputValue, SessionInputs};
use ort::value::Tensor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// ONNX graph locations tried in order.
const ONNX_CANDIDATES: &[&str] = &["onnx/model.onnx", "model.onnx"];

const TOKENIZER_FILE: &str = "tokenizer.json";
const CONFIG_FILE: &str = "config.json";
const SENTENCE_CONFIG_FILE: &str = "sentence_bert_config.json";

/// Truncation limit when neither config states one.
const DEFAULT_MAX_TOKENS: usize = 512;

/// Architectures whose exported graphs take no `token_type_ids` input.
const NO_TOKEN_TYPE_MODELS: &[&str] = &["mpnet", "distilbert", "roberta", "xlm-roberta"];

/// Version of the ONNX Runtime binding, reported in hardware snapshots.
pub const RUNTIME_VERSION: &str = "onnxruntime (ort 2.0.0-rc.11)";

/// Backend that loads HuggingFace ONNX exports through `ort`.
#[derive(Debug, Clone)]
pub struct OrtBackend {
    cache_dir: PathBuf,
    fetch_parameter_counts: bool,
}

impl OrtBackend {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            fetch_parameter_counts: true,
        }
    }

    /// Skip the HuggingFace API call that supplies parameter counts.
    #[must_use]
    pub fn without_parameter_counts(mut self) -> Self {
        self.fetch_parameter_counts = false;
        self
    }

    fn hub(&self) -> Result<hf_hub::api::sync::Api> {
        hf_hub::api::sync::ApiBuilder::new()
            .with_cache_dir(self.cache_dir.clone())
            .with_progress(false)
            .build()
            .map_err(|e| BenchError::Model(format!("HF Hub API init failed: {e}")))
    }

    fn resolve_files(&self, model_id: &str) -> Result<ModelFiles> {
        let api = self.hub()?;
        let repo = api.model(model_id.to_owned());

        let onnx = ONNX_CANDIDATES
            .iter()
            .find_map(|name| repo.get(name).ok())
            .ok_or_else(|| {
                BenchError::Model(format!("{model_id} publishes no ONNX graph ({ONNX_CANDIDATES:?})"))
            })?;
        let tokenizer = repo.get(TOKENIZER_FILE).map_err(|e| {
            BenchError::Model(format!("failed to download {TOKENIZER_FILE} for {model_id}: {e}"))
        })?;

        Ok(ModelFiles {
            onnx,
            tokenizer,
            config: repo.get(CONFIG_FILE).ok(),
            sentence_config: repo.get(SENTENCE_CONFIG_FILE).ok(),
        })
    }
}

impl EmbeddingBackend for OrtBackend {
    type Handle = OrtEmbedder;

    fn accelerator_available(&self) -> bool {
        cuda_available()
    }

    fn load(&self, entry: &CatalogEntry, device: Device) -> Result<OrtEmbedder> {
        info!("loading {} on {device}", entry.model_id);
        let files = self.resolve_files(&entry.model_id)?;
        OrtEmbedder::new(entry, device, files)
    }

    fn describe(&self, entry: &CatalogEntry, handle: &OrtEmbedder) -> ModelInfo {
        let mut info = ModelInfo::unknown(entry);
        let sentence_max = handle
            .files
            .sentence_config
            .as_deref()
            .and_then(metadata::read_sentence_max_length);
        metadata::apply_configs(&mut info, handle.config.as_ref(), sentence_max);
        if self.fetch_parameter_counts {
            info.num_parameters = metadata::fetch_parameter_count(&entry.model_id);
        }
        info
    }
}

#[cfg(feature = "cuda")]
fn cuda_available() -> bool {
    use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
    CUDAExecutionProvider::default().is_available().unwrap_or(false)
}

#[cfg(not(feature = "cuda"))]
fn cuda_available() -> bool {
    false
}

fn execution_provider(device: Device) -> Result<ExecutionProviderDispatch> {
    match device {
        Device::Cpu => {
            use ort::execution_providers::CPUExecutionProvider;
            Ok(CPUExecutionProvider::default().build())
        }
        #[cfg(feature = "cuda")]
        Device::Cuda => {
            use ort::execution_providers::CUDAExecutionProvider;
            // Fail the load instead of silently running on the CPU.
            Ok(CUDAExecutionProvider::default().build().error_on_failure())
        }
        #[cfg(not(feature = "cuda"))]
        Device::Cuda => Err(BenchError::Model(
            "built without the `cuda` feature".to_owned(),
        )),
    }
}

#[derive(Debug, Clone)]
struct ModelFiles {
    onnx: PathBuf,
    tokenizer: PathBuf,
    config: Option<PathBuf>,
    sentence_config: Option<PathBuf>,
}

/// Token ids, attention mask and type ids for a padded batch, row-major.
struct EncodedBatch {
    batch_size: usize,
    seq_len: usize,
    ids: Vec<i64>,
    mask: Vec<i64>,
    type_ids: Vec<i64>,
}

/// A loaded ONNX embedding session.
///
/// Not thread-safe: inference needs `&mut self`. Dropping it frees the
/// session and its device allocations.
pub struct OrtEmbedder {
    model_id: String,
    kind: ModelKind,
    device: Device,
    session: Session,
    tokenizer: tokenizers::Tokenizer,
    feed_token_types: bool,
    config: Option<RawConfig>,
    files: ModelFiles,
}

impl std::fmt::Debug for OrtEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtEmbedder")
            .field("model_id", &self.model_id)
            .field("kind", &self.kind)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl OrtEmbedder {
    fn new(entry: &CatalogEntry, device: Device, files: ModelFiles) -> Result<Self> {
        let config = files.config.as_deref().and_then(metadata::read_config);
        let sentence_max = files
            .sentence_config
            .as_deref()
            .and_then(metadata::read_sentence_max_length);
        let max_tokens = sentence_max
            .or_else(|| config.as_ref().and_then(RawConfig::max_length))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);
        let feed_token_types = config
            .as_ref()
            .and_then(|c| c.model_type.as_deref())
            .is_none_or(|t| !NO_TOKEN_TYPE_MODELS.contains(&t));

        debug!("building ONNX session: {}", files.onnx.display());
        let session = Session::builder()
            .map_err(|e| BenchError::Model(format!("session builder failed: {e}")))?
            .with_execution_providers([execution_provider(device)?])
            .map_err(|e| BenchError::Model(format!("{device} execution provider failed: {e}")))?
            .commit_from_file(&files.onnx)
            .map_err(|e| BenchError::Model(format!("ONNX model load failed: {e}")))?;

        let tokenizer = load_tokenizer(&files.tokenizer, max_tokens)?;

        Ok(Self {
            model_id: entry.model_id.clone(),
            kind: entry.kind,
            device,
            session,
            tokenizer,
            feed_token_types,
            config,
            files,
        })
    }

    fn encode(&self, texts: &[&str]) -> Result<EncodedBatch> {
        let encodings = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(*t, true)
                    .map_err(|e| BenchError::Inference(format!("tokenization failed: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let batch_size = encodings.len();
        let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let mut ids = vec![0i64; batch_size * seq_len];
        let mut mask = vec![0i64; batch_size * seq_len];
        let mut type_ids = vec![0i64; batch_size * seq_len];

        for (i, enc) in encodings.iter().enumerate() {
            let offset = i * seq_len;
            for (j, &id) in enc.get_ids().iter().enumerate() {
                ids[offset + j] = i64::from(id);
            }
            for (j, &m) in enc.get_attention_mask().iter().enumerate() {
                mask[offset + j] = i64::from(m);
            }
            for (j, &t) in enc.get_type_ids().iter().enumerate() {
                type_ids[offset + j] = i64::from(t);
            }
        }

        Ok(EncodedBatch {
            batch_size,
            seq_len,
            ids,
            mask,
            type_ids,
        })
    }

    /// Run the graph and return `(dims, flat output)` of its first output.
    fn forward(&mut self, batch: &EncodedBatch) -> Result<(Vec<i64>, Vec<f32>)> {
        let shape = [batch.batch_size, batch.seq_len];
        let ids = Tensor::from_array((shape, batch.ids.clone()))
            .map_err(|e| BenchError::Inference(format!("input_ids tensor failed: {e}")))?;
        let mask = Tensor::from_array((shape, batch.mask.clone()))
            .map_err(|e| BenchError::Inference(format!("attention_mask tensor failed: {e}")))?;

        let mut feed: HashMap<String, SessionInputValue> = HashMap::new();
        feed.insert("input_ids".to_owned(), ids.into());
        feed.insert("attention_mask".to_owned(), mask.into());
        if self.feed_token_types {
            let types = Tensor::from_array((shape, batch.type_ids.clone())).map_err(|e| {
                BenchError::Inference(format!("token_type_ids tensor failed: {e}"))
            })?;
            feed.insert("token_type_ids".to_owned(), types.into());
        }

        let outputs = self
            .session
            .run(SessionInputs::from(feed))
            .map_err(|e| BenchError::Inference(format!("ONNX inference failed: {e}")))?;
        let (dims, data) = outputs[0_usize]
            .try_extract_tensor::<f32>()
            .map_err(|e| BenchError::Inference(format!("output extraction failed: {e}")))?;

        Ok((dims.iter().copied().collect(), data.to_vec()))
    }
}

impl EmbeddingHandle for OrtEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| BenchError::Inference("model returned no embedding".to_owned()))
    }

    fn embed_batch(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let batch = self.encode(texts)?;
        let (dims, flat) = self.forward(&batch)?;
        pool_output(self.kind, &batch, &dims, &flat)
    }

    fn synchronize(&mut self) -> Result<()> {
        // `Session::run` returns only after the outputs have been copied back
        // to host memory, so no device work is outstanding here.
        Ok(())
    }
}

impl Drop for OrtEmbedder {
    fn drop(&mut self) {
        debug!("releasing {} on {}", self.model_id, self.device);
    }
}

fn load_tokenizer(path: &Path, max_tokens: usize) -> Result<tokenizers::Tokenizer> {
    let mut tokenizer = tokenizers::Tokenizer::from_file(path)
        .map_err(|e| BenchError::Model(format!("tokenizer load failed: {e}")))?;

    let truncation = tokenizers::TruncationParams {
        max_length: max_tokens,
        ..Default::default()
    };
    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| BenchError::Model(format!("tokenizer truncation config failed: {e}")))?;
    // Batches are padded by `encode`.
    tokenizer.with_padding(None);
    Ok(tokenizer)
}

fn dim_at(dims: &[i64], axis: usize) -> Result<usize> {
    dims.get(axis)
        .and_then(|&d| usize::try_from(d).ok())
        .filter(|&d| d > 0)
        .ok_or_else(|| BenchError::Inference(format!("unexpected output shape {dims:?}")))
}

fn shape_error(dims: &[i64], detail: &str) -> BenchError {
    BenchError::Inference(format!("unexpected output shape {dims:?}: {detail}"))
}

/// Turn the first graph output into one vector per text.
///
/// Rank 2 is an already-pooled `[batch, dim]` output. Rank 3 is
/// `[batch, seq_len, width]` token states (dense) or vocabulary logits
/// (sparse). Dense vectors are L2-normalized; sparse weights are left as is.
fn pool_output(
    kind: ModelKind,
    batch: &EncodedBatch,
    dims: &[i64],
    flat: &[f32],
) -> Result<Vec<Vec<f32>>> {
    let finish = |v: Vec<f32>| match kind {
        ModelKind::Dense => normalized(v),
        ModelKind::Sparse => v,
    };

    match dims.len() {
        2 => {
            let width = dim_at(dims, 1)?;
            if flat.len() != batch.batch_size * width {
                return Err(shape_error(dims, "element count does not match batch"));
            }
            Ok(flat.chunks_exact(width).map(|v| finish(v.to_vec())).collect())
        }
        3 => {
            let width = dim_at(dims, 2)?;
            if dim_at(dims, 1)? != batch.seq_len {
                return Err(shape_error(dims, "sequence axis does not match input"));
            }
            let row = batch.seq_len * width;
            if flat.len() != batch.batch_size * row {
                return Err(shape_error(dims, "element count does not match batch"));
            }
            Ok(flat
                .chunks_exact(row)
                .zip(batch.mask.chunks_exact(batch.seq_len))
                .map(|(tokens, mask)| match kind {
                    ModelKind::Dense => finish(masked_mean(tokens, mask, width)),
                    ModelKind::Sparse => splade_pool(tokens, mask, width),
                })
                .collect())
        }
        _ => Err(shape_error(dims, "expected rank 2 or 3")),
    }
}

/// Average the token rows whose mask is set. An all-padding input pools to zeros.
fn masked_mean(tokens: &[f32], mask: &[i64], width: usize) -> Vec<f32> {
    let kept: Vec<&[f32]> = tokens
        .chunks_exact(width)
        .zip(mask)
        .filter(|&(_, &m)| m != 0)
        .map(|(row, _)| row)
        .collect();
    let mut sum = vec![0.0f32; width];
    for row in &kept {
        sum.iter_mut().zip(*row).for_each(|(acc, x)| *acc += x);
    }
    if !kept.is_empty() {
        let n = kept.len() as f32;
        sum.iter_mut().for_each(|x| *x /= n);
    }
    sum
}

/// SPLADE pooling of `[seq_len, vocab]` logits: per vocabulary entry, the
/// maximum over positions of `log(1 + relu(x)) * mask`.
fn splade_pool(logits: &[f32], mask: &[i64], vocab: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; vocab];
    for (row, _) in logits.chunks_exact(vocab).zip(mask).filter(|&(_, &m)| m != 0) {
        for (p, &x) in pooled.iter_mut().zip(row) {
            *p = p.max(x.max(0.0).ln_1p());
        }
    }
    pooled
}

/// Scale to unit L2 norm in place; near-zero vectors are returned unchanged.
fn normalized(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm >= 1e-12 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}
