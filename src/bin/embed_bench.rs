//! Embedding model latency benchmark: CPU vs GPU.

use clap::{Parser, ValueEnum};
use embed_bench::config::DevicePolicy;
use embed_bench::report::{self, ReportDataset};
use embed_bench::{BenchConfig, BenchmarkOrchestrator, OrtBackend, OutputFormat, RunMode};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Output format selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fmt {
    Json,
    Csv,
    Md,
}

impl From<Fmt> for OutputFormat {
    fn from(f: Fmt) -> Self {
        match f {
            Fmt::Json => Self::Json,
            Fmt::Csv => Self::Csv,
            Fmt::Md => Self::Md,
        }
    }
}

/// Benchmark text embedding models on CPU and GPU.
#[derive(Parser)]
#[command(name = "embed-bench", version, about)]
struct Cli {
    /// Path to TOML configuration file. Flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of timed iterations (default: 100, or 10 with --full).
    #[arg(short = 'n', long)]
    iterations: Option<u64>,

    /// Number of warmup iterations (default: 10, or 3 with --full).
    #[arg(short, long)]
    warmup: Option<u64>,

    /// Output formats; repeat for several.
    #[arg(short, long = "fmt", value_enum)]
    fmt: Vec<Fmt>,

    /// Benchmark the comprehensive model set.
    #[arg(long)]
    full: bool,

    /// Load models for metadata only; skip timing.
    #[arg(long)]
    dry_run: bool,

    /// Never use the GPU.
    #[arg(long)]
    cpu_only: bool,

    /// Directory for report files.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Skip the HuggingFace API lookup of parameter counts.
    #[arg(long)]
    offline_metadata: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_file(path)?,
            None => BenchConfig::default(),
        };
        if self.full {
            config.mode = RunMode::Full;
        }
        if self.iterations.is_some() {
            config.iterations = self.iterations;
        }
        if self.warmup.is_some() {
            config.warmup = self.warmup;
        }
        if !self.fmt.is_empty() {
            config.formats = self.fmt.into_iter().map(OutputFormat::from).collect();
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.cpu_only {
            config.devices = DevicePolicy::CpuOnly;
        }
        if self.output_dir.is_some() {
            config.output_dir = self.output_dir;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("embed_bench=info,hf_hub=warn,ort=warn")),
        )
        .init();

    let cli = Cli::parse();
    let offline_metadata = cli.offline_metadata;
    let config = cli.into_config()?;

    let mut backend = OrtBackend::new(embed_bench::bench_dirs::cache_dir());
    if offline_metadata {
        backend = backend.without_parameter_counts();
    }

    let orchestrator = BenchmarkOrchestrator::new(&backend, &config)?;
    let pb = ProgressBar::new(orchestrator.progress_len());
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner} {msg:24} [{bar:40}] {pos}/{len} ({percent}%) {elapsed_precise}",
    ) {
        pb.set_style(style);
    }

    let results = orchestrator.run(&pb);
    pb.finish_and_clear();

    let dataset = ReportDataset::build(&results);
    print!("{}", report::render_console(&dataset));

    if !config.formats.is_empty() {
        let written = report::export(&dataset, &config.formats, &config.output_dir())?;
        println!();
        for path in written {
            println!("saved: {}", path.display());
        }
    }
    println!(
        "\nBenchmark complete! Total runtime: {}",
        report::runtime_str(results.total_runtime_seconds)
    );
    Ok(())
}
