//! Best-effort model metadata from HuggingFace config files and the Hub API.
//!
//! Every lookup here is optional: a missing file, malformed JSON, or network
//! failure leaves the corresponding [`ModelInfo`] field unknown and never
//! fails the benchmark unit.

use super::ModelInfo;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Partial `config.json`. Architectures disagree on key names, and each key
/// is read on its own so one malformed value only loses that value.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawConfig {
    pub model_type: Option<String>,
    pub hidden_size: Option<u64>,
    pub d_model: Option<u64>,
    pub vocab_size: Option<u64>,
    pub max_position_embeddings: Option<u64>,
    pub max_seq_length: Option<u64>,
    pub n_positions: Option<u64>,
}

impl RawConfig {
    /// Parse a `config.json` body. `None` only when the body is not a JSON
    /// object at all.
    pub fn parse(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        let obj = value.as_object()?;
        let uint = |key: &str| obj.get(key).and_then(Value::as_u64);
        Some(Self {
            model_type: obj.get("model_type").and_then(Value::as_str).map(str::to_owned),
            hidden_size: uint("hidden_size"),
            d_model: uint("d_model"),
            vocab_size: uint("vocab_size"),
            max_position_embeddings: uint("max_position_embeddings"),
            max_seq_length: uint("max_seq_length"),
            n_positions: uint("n_positions"),
        })
    }

    pub fn embedding_dim(&self) -> Option<u64> {
        self.hidden_size.or(self.d_model)
    }

    pub fn max_length(&self) -> Option<u64> {
        self.max_position_embeddings
            .or(self.max_seq_length)
            .or(self.n_positions)
    }
}

/// `sentence_bert_config.json`: the truncation limit sentence-transformers applies.
#[derive(Debug, Deserialize)]
struct SentenceBertConfig {
    max_seq_length: Option<u64>,
}

/// Read `config.json`, returning `None` if it is missing or not a JSON object.
pub fn read_config(path: &Path) -> Option<RawConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    let config = RawConfig::parse(&content);
    if config.is_none() {
        debug!("ignoring malformed {}", path.display());
    }
    config
}

/// Parse `sentence_bert_config.json` for its `max_seq_length`.
pub fn read_sentence_max_length(path: &Path) -> Option<u64> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str::<SentenceBertConfig>(&content)
        .ok()?
        .max_seq_length
}

/// Fill `info` from the parsed configs. Sparse models report the vocabulary
/// size as their embedding dimension.
pub fn apply_configs(
    info: &mut ModelInfo,
    config: Option<&RawConfig>,
    sentence_max_length: Option<u64>,
) {
    if let Some(cfg) = config {
        info.model_type = cfg.model_type.clone();
        info.embedding_dim = if info.is_sparse {
            cfg.vocab_size
        } else {
            cfg.embedding_dim()
        };
        info.max_seq_length = cfg.max_length();
    }
    if !info.is_sparse
        && let Some(len) = sentence_max_length
    {
        info.max_seq_length = Some(len);
    }
}

#[derive(Debug, Deserialize)]
struct HubModelWire {
    safetensors: Option<SafetensorsWire>,
}

#[derive(Debug, Deserialize)]
struct SafetensorsWire {
    total: Option<u64>,
}

fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(20))
        .build()
}

/// Extract `safetensors.total` from a Hub model-info response body.
pub fn parse_parameter_count(body: &str) -> Option<u64> {
    let wire: HubModelWire = serde_json::from_str(body).ok()?;
    wire.safetensors?.total
}

/// Total parameter count as published by the HuggingFace model API.
pub fn fetch_parameter_count(model_id: &str) -> Option<u64> {
    let url = format!("https://huggingface.co/api/models/{model_id}");
    let resp = match http_agent()
        .get(&url)
        .set("User-Agent", "embed-bench/0.3 (metadata)")
        .call()
    {
        Ok(resp) => resp,
        Err(e) => {
            debug!("parameter count lookup failed for {model_id}: {e}");
            return None;
        }
    };
    let body = resp.into_string().ok()?;
    parse_parameter_count(&body)
}
