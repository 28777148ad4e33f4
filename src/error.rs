//! Error types for the embedding benchmark.

/// Top-level error type for the benchmark library.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Model download, session construction, or tokenizer load error.
    #[error("model error: {0}")]
    Model(String),

    /// Tokenization, forward pass, or output extraction error.
    #[error("inference error: {0}")]
    Inference(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Report serialization or rendering error.
    #[error("report error: {0}")]
    Report(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BenchError>;
