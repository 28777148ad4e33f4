//! Filesystem locations used by the benchmark.
//!
//! # Environment Overrides
//!
//! - `EMBED_BENCH_RESULTS_DIR` overrides [`results_dir`]
//! - `EMBED_BENCH_CACHE_DIR` overrides [`cache_dir`]

use std::path::PathBuf;

/// Report artifact directory, `benchmarks/results` under the working directory.
#[must_use]
pub fn results_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("EMBED_BENCH_RESULTS_DIR") {
        return PathBuf::from(override_dir);
    }
    PathBuf::from("benchmarks").join("results")
}

/// Model download cache.
///
/// Resolves to `dirs::cache_dir()/embed-bench/` by default.
#[must_use]
pub fn cache_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("EMBED_BENCH_CACHE_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::cache_dir()
        .map(|d| d.join("embed-bench"))
        .unwrap_or_else(|| PathBuf::from("/tmp/embed-bench-cache"))
}
