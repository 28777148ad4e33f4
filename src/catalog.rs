//! Static model catalog, benchmark query texts, and report ordering tables.
//!
//! Two curated model sets are available: [`ModelCatalog::quick`] (5 models)
//! and [`ModelCatalog::full`] (18 models). Every report orders rows by the
//! explicit rank tables in this module rather than by registry iteration
//! order; size labels missing from [`SIZE_RANKS`] sort after every known label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Embedding model family, which selects the backend loading path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// One pooled vector per input text.
    Dense,
    /// SPLADE-style vocabulary-sized sparse vector.
    Sparse,
}

/// One benchmarkable model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Short label used for grouping and ordering (e.g. `"small"`).
    pub size_label: String,
    /// HuggingFace repo id (e.g. `"BAAI/bge-small-en-v1.5"`).
    pub model_id: String,
    pub kind: ModelKind,
}

impl CatalogEntry {
    pub fn dense(size_label: &str, model_id: &str) -> Self {
        Self {
            size_label: size_label.to_owned(),
            model_id: model_id.to_owned(),
            kind: ModelKind::Dense,
        }
    }

    pub fn sparse(size_label: &str, model_id: &str) -> Self {
        Self {
            size_label: size_label.to_owned(),
            model_id: model_id.to_owned(),
            kind: ModelKind::Sparse,
        }
    }

    pub fn is_sparse(&self) -> bool {
        self.kind == ModelKind::Sparse
    }
}

const QUICK_DENSE: &[(&str, &str)] = &[
    ("small", "sentence-transformers/all-MiniLM-L6-v2"),
    ("medium", "sentence-transformers/all-mpnet-base-v2"),
    ("large", "BAAI/bge-large-en-v1.5"),
];

const FULL_DENSE: &[(&str, &str)] = &[
    // Tiny (< 25M params)
    ("tiny-minilm-l6", "sentence-transformers/all-MiniLM-L6-v2"),
    ("tiny-minilm-l3", "sentence-transformers/paraphrase-MiniLM-L3-v2"),
    // Small (25-50M params)
    ("small-minilm-l12", "sentence-transformers/all-MiniLM-L12-v2"),
    ("small-bge", "BAAI/bge-small-en-v1.5"),
    // Medium (100-150M params)
    ("medium-mpnet", "sentence-transformers/all-mpnet-base-v2"),
    ("medium-bge", "BAAI/bge-base-en-v1.5"),
    ("medium-gte", "thenlper/gte-base"),
    ("medium-e5", "intfloat/e5-base-v2"),
    // Large (300-400M params)
    ("large-bge", "BAAI/bge-large-en-v1.5"),
    ("large-gte", "thenlper/gte-large"),
    ("large-e5", "intfloat/e5-large-v2"),
    // Multilingual
    (
        "multi-minilm",
        "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2",
    ),
    ("multi-e5", "intfloat/multilingual-e5-base"),
    // Specialized
    ("code-jina", "jinaai/jina-embeddings-v2-base-code"),
    ("long-jina", "jinaai/jina-embeddings-v2-base-en"),
    ("matryoshka-nomic", "nomic-ai/nomic-embed-text-v1.5"),
];

const SPARSE: &[(&str, &str)] = &[
    ("sparse-small", "prithivida/Splade_PP_en_v1"),
    ("sparse-large", "naver/efficient-splade-VI-BT-large-query"),
];

/// Sort key per size label. Quick and full labels share one table.
pub const SIZE_RANKS: &[(&str, u32)] = &[
    ("tiny-minilm-l6", 1),
    ("tiny-minilm-l3", 2),
    ("small", 10),
    ("small-minilm-l12", 11),
    ("small-bge", 12),
    ("medium", 20),
    ("medium-mpnet", 21),
    ("medium-bge", 22),
    ("medium-gte", 23),
    ("medium-e5", 24),
    ("large", 30),
    ("large-bge", 31),
    ("large-gte", 32),
    ("large-e5", 33),
    ("multi-minilm", 40),
    ("multi-e5", 41),
    ("code-jina", 50),
    ("long-jina", 51),
    ("matryoshka-nomic", 52),
    ("sparse-small", 100),
    ("sparse-large", 101),
];

/// Rank assigned to size labels absent from [`SIZE_RANKS`].
pub const UNKNOWN_SIZE_RANK: u32 = u32::MAX;

/// Look up the sort key for a size label.
pub fn size_rank(label: &str) -> u32 {
    SIZE_RANKS
        .iter()
        .find(|(l, _)| *l == label)
        .map_or(UNKNOWN_SIZE_RANK, |(_, rank)| *rank)
}

/// Benchmark query length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryLength {
    Short,
    Medium,
    Long,
}

impl QueryLength {
    /// All query lengths in report order.
    pub const ALL: [QueryLength; 3] = [QueryLength::Short, QueryLength::Medium, QueryLength::Long];

    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Fixed sort key: short=0, medium=1, long=2.
    pub fn rank(self) -> u32 {
        match self {
            Self::Short => 0,
            Self::Medium => 1,
            Self::Long => 2,
        }
    }

    /// The literal query text embedded for this bucket.
    pub fn text(self) -> &'static str {
        match self {
            Self::Short => "machine learning basics",
            Self::Medium => {
                "What are the best practices for implementing distributed systems with high availability?"
            }
            Self::Long => concat!(
                "I'm looking for comprehensive documentation on how to design and implement ",
                "a fault-tolerant microservices architecture that can handle millions of requests ",
                "per second while maintaining sub-millisecond latency and ensuring data consistency ",
                "across multiple geographic regions with automatic failover capabilities."
            ),
        }
    }
}

impl fmt::Display for QueryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered registry of models to benchmark: dense models first, then sparse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: Vec<CatalogEntry>,
}

impl ModelCatalog {
    /// The default five-model set.
    pub fn quick() -> Self {
        Self::from_tables(QUICK_DENSE, SPARSE)
    }

    /// The comprehensive set covering tiny through specialized models.
    pub fn full() -> Self {
        Self::from_tables(FULL_DENSE, SPARSE)
    }

    /// Build a catalog from explicit entries, keeping dense models ahead of
    /// sparse ones and otherwise preserving the given order.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let (mut dense, sparse): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.kind == ModelKind::Dense);
        dense.extend(sparse);
        Self { entries: dense }
    }

    fn from_tables(dense: &[(&str, &str)], sparse: &[(&str, &str)]) -> Self {
        let entries = dense
            .iter()
            .map(|(size, id)| CatalogEntry::dense(size, id))
            .chain(sparse.iter().map(|(size, id)| CatalogEntry::sparse(size, id)))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dense(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.kind == ModelKind::Dense)
    }

    pub fn sparse(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.kind == ModelKind::Sparse)
    }
}
