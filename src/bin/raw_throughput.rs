//! Raw batched embedding throughput for a single model.

use clap::{Parser, ValueEnum};
use embed_bench::throughput::{run_batched, synthetic_corpus};
use embed_bench::{CatalogEntry, Device, EmbeddingBackend, OrtBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceArg {
    Cpu,
    Cuda,
}

/// Embed a synthetic corpus in batches and report embeddings/second.
#[derive(Parser)]
#[command(name = "raw-throughput", version, about)]
struct Cli {
    /// HuggingFace model id, e.g. BAAI/bge-small-en-v1.5.
    model: String,

    /// Total number of texts to embed.
    num_texts: usize,

    /// Texts per batch (default: all texts in one batch).
    batch_size: Option<usize>,

    /// Execution device.
    #[arg(long, value_enum, default_value = "cuda")]
    device: DeviceArg,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("embed_bench=info,hf_hub=warn,ort=warn")),
        )
        .init();

    let cli = Cli::parse();
    let device = match cli.device {
        DeviceArg::Cpu => Device::Cpu,
        DeviceArg::Cuda => Device::Cuda,
    };
    let batch_size = cli.batch_size.unwrap_or(cli.num_texts.max(1));

    let backend = OrtBackend::new(embed_bench::bench_dirs::cache_dir()).without_parameter_counts();
    let entry = CatalogEntry::dense("custom", &cli.model);
    let mut handle = backend.load(&entry, device)?;
    info!("{} loaded on {device}", cli.model);

    let texts = synthetic_corpus(cli.num_texts);
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("Model:   {}", cli.model);
    println!("Testing: {} texts in batches of {batch_size}", cli.num_texts);
    println!("{rule}");

    let report = run_batched(&mut handle, &texts, batch_size)?;
    let (rows, cols) = report.output_shape();
    println!("\nDuration:    {:.2}s", report.duration.as_secs_f64());
    println!("Throughput:  {:.0} emb/sec", report.embeddings_per_second());
    println!("Output:      ({rows}, {cols})");
    println!("\n{rule}");
    println!("RESULT: {:.0} embeddings/second", report.embeddings_per_second());
    println!("{rule}");
    Ok(())
}
