use embed_bench::backend::{Device, EmbeddingBackend, EmbeddingHandle};
use embed_bench::catalog::{CatalogEntry, QueryLength};
use embed_bench::throughput;
use embed_bench::{EmbeddingRunner, OrtBackend};
use indicatif::ProgressBar;

fn backend() -> OrtBackend {
    OrtBackend::new(embed_bench::bench_dirs::cache_dir())
}

#[test]
#[ignore] // Requires network + model download (~90 MB)
fn minilm_embeds_normalized_vectors_on_cpu() {
    let backend = backend();
    let entry = CatalogEntry::dense("small", "sentence-transformers/all-MiniLM-L6-v2");
    let mut handle = backend.load(&entry, Device::Cpu).expect("load model");

    let v = handle.embed(QueryLength::Medium.text()).unwrap();
    assert_eq!(v.len(), 384);
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-3, "norm was {norm}");
    handle.synchronize().unwrap();

    let info = backend.describe(&entry, &handle);
    assert_eq!(info.embedding_dim, Some(384));
    assert_eq!(info.model_type.as_deref(), Some("bert"));
}

#[test]
#[ignore] // Requires network + model download (~90 MB)
fn minilm_unit_collects_requested_samples() {
    let backend = backend().without_parameter_counts();
    let entry = CatalogEntry::dense("small", "sentence-transformers/all-MiniLM-L6-v2");
    let runner = EmbeddingRunner::new(&backend, 3, 1);

    let unit = runner
        .run_unit(&entry, Device::Cpu, &ProgressBar::hidden())
        .unwrap();
    assert_eq!(unit.len(), 3);
    assert!(unit.iter().all(|r| r.sample_count() == 3));
    assert!(unit.iter().all(|r| r.load_time_ms.is_some()));
}

#[test]
#[ignore] // Requires network + model download (~90 MB)
fn minilm_batched_throughput() {
    let backend = backend();
    let entry = CatalogEntry::dense("small", "sentence-transformers/all-MiniLM-L6-v2");
    let mut handle = backend.load(&entry, Device::Cpu).unwrap();

    let corpus = throughput::synthetic_corpus(64);
    let report = throughput::run_batched(&mut handle, &corpus, 16).unwrap();
    assert_eq!(report.batches, 4);
    assert_eq!(report.embedding_dim, Some(384));
    assert!(report.embeddings_per_second() > 0.0);
}
