use crate::helpers::{ScriptedBackend, cpu_only_config, config, two_dense_catalog};
use embed_bench::backend::Device;
use embed_bench::catalog::{CatalogEntry, ModelCatalog, QueryLength};
use embed_bench::report::{self, ReportDataset};
use embed_bench::{BenchConfig, BenchmarkOrchestrator};
use indicatif::ProgressBar;

#[test]
fn two_dense_models_on_cpu_produce_six_rows_and_six_csv_lines() {
    let backend = ScriptedBackend::cpu_only();
    let config = config(5, 1);
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    let pb = ProgressBar::hidden();
    pb.set_length(orchestrator.progress_len());

    let results = orchestrator.run(&pb);
    assert_eq!(results.len(), 6);
    assert!(results.results().iter().all(|r| r.sample_count() == 5));
    assert!(!results.gpu_available);
    assert_eq!(pb.position(), 30);
    assert_eq!(pb.position(), orchestrator.progress_len());

    let dataset = ReportDataset::build(&results);
    assert_eq!(dataset.rows.len(), 6);
    for row in &dataset.rows {
        assert!(row.cpu.mean_ms >= 0.0);
        assert!(row.cpu.p50_ms <= row.cpu.p95_ms);
        assert!(row.gpu.is_none());
        assert!(row.speedup().is_none());
        assert!(row.gpu_load_time_ms.is_none());
        assert_eq!(row.embedding_dim, Some(8));
    }

    let dir = tempfile::tempdir().unwrap();
    let written = report::export(&dataset, &config.formats, dir.path()).unwrap();
    assert_eq!(written.len(), 3);

    let csv = std::fs::read_to_string(dir.path().join("embed_bench.csv")).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("model,size,params"));
    assert_eq!(lines.filter(|l| !l.is_empty()).count(), 6);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("embed_bench.json")).unwrap())
            .unwrap();
    assert_eq!(json["comparison"].as_array().unwrap().len(), 6);
    assert_eq!(json["config"]["iterations"], 5);
    assert_eq!(json["config"]["warmup"], 1);
    assert_eq!(json["aggregations_by_query_size"].as_array().unwrap().len(), 3);
    assert_eq!(json["aggregations_by_model_size"].as_array().unwrap().len(), 2);
}

#[test]
fn rows_follow_size_then_query_order() {
    let backend = ScriptedBackend::cpu_only();
    let config = config(2, 0);
    // Registered largest first; reports must still put "small" first.
    let catalog = ModelCatalog::from_entries(vec![
        CatalogEntry::dense("medium", "test/base-b"),
        CatalogEntry::dense("small", "test/mini-a"),
    ]);
    let orchestrator = BenchmarkOrchestrator::with_catalog(&backend, &config, catalog).unwrap();
    let results = orchestrator.run(&ProgressBar::hidden());

    let dataset = ReportDataset::build(&results);
    let order: Vec<_> = dataset
        .rows
        .iter()
        .map(|r| (r.size_label.as_str(), r.query_length))
        .collect();
    assert_eq!(
        order,
        vec![
            ("small", QueryLength::Short),
            ("small", QueryLength::Medium),
            ("small", QueryLength::Long),
            ("medium", QueryLength::Short),
            ("medium", QueryLength::Medium),
            ("medium", QueryLength::Long),
        ]
    );
}

#[test]
fn dry_run_yields_one_zero_sample_per_query() {
    let backend = ScriptedBackend::with_accelerator();
    let config = BenchConfig {
        dry_run: true,
        ..config(100, 10)
    };
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    assert_eq!(orchestrator.progress_len(), 2);

    let pb = ProgressBar::hidden();
    let results = orchestrator.run(&pb);
    assert_eq!(pb.position(), 2);
    assert_eq!(results.len(), 2 * QueryLength::ALL.len());
    for r in results.results() {
        assert_eq!(r.samples_ms(), &[0.0]);
        assert_eq!(r.device, Device::Cpu);
        assert!(r.model_info.is_some());
    }
    // Metadata-only runs never touch the accelerator.
    assert!(backend.loads.borrow().iter().all(|(_, d)| *d == Device::Cpu));
    assert_eq!(backend.loads.borrow().len(), 2);
}

#[test]
fn accelerator_run_pairs_cpu_and_gpu_results() {
    let backend = ScriptedBackend::with_accelerator();
    let config = config(3, 1);
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    assert_eq!(orchestrator.devices(), vec![Device::Cpu, Device::Cuda]);

    let pb = ProgressBar::hidden();
    let results = orchestrator.run(&pb);
    assert!(results.gpu_available);
    assert_eq!(results.len(), 12);
    assert_eq!(pb.position(), 2 * 2 * 3 * 3);

    let dataset = ReportDataset::build(&results);
    assert_eq!(dataset.rows.len(), 6);
    assert!(dataset.rows.iter().all(|r| r.gpu.is_some()));
    assert!(dataset.rows.iter().all(|r| r.gpu_load_time_ms.is_some()));

    let md = report::render_markdown(&dataset);
    assert!(md.contains("| GPU Mean | GPU P50 | GPU P95 | Speedup |"));
}

#[test]
fn cpu_only_policy_ignores_available_accelerator() {
    let backend = ScriptedBackend::with_accelerator();
    let config = cpu_only_config(2, 0);
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    assert_eq!(orchestrator.devices(), vec![Device::Cpu]);

    let results = orchestrator.run(&ProgressBar::hidden());
    assert!(!results.gpu_available);
    assert!(results.results().iter().all(|r| r.device == Device::Cpu));
}

#[test]
fn devices_outer_loop_dense_before_sparse() {
    let backend = ScriptedBackend::with_accelerator();
    let config = config(1, 0);
    let catalog = ModelCatalog::from_entries(vec![
        CatalogEntry::sparse("sparse-small", "test/splade"),
        CatalogEntry::dense("small", "test/mini-a"),
    ]);
    let orchestrator = BenchmarkOrchestrator::with_catalog(&backend, &config, catalog).unwrap();
    orchestrator.run(&ProgressBar::hidden());

    let loads = backend.loads.borrow();
    let order: Vec<_> = loads.iter().map(|(m, d)| (m.as_str(), *d)).collect();
    assert_eq!(
        order,
        vec![
            ("test/mini-a", Device::Cpu),
            ("test/splade", Device::Cpu),
            ("test/mini-a", Device::Cuda),
            ("test/splade", Device::Cuda),
        ]
    );
    assert_eq!(backend.live_handles.get(), 0);
}

#[test]
fn zero_iterations_rejected_before_running() {
    let backend = ScriptedBackend::cpu_only();
    let config = config(0, 1);
    let result = BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog());
    assert!(result.is_err());
    assert!(backend.loads.borrow().is_empty());
}

#[test]
fn quick_mode_catalog_is_default() {
    let backend = ScriptedBackend::cpu_only();
    let orchestrator = BenchmarkOrchestrator::new(&backend, &config(1, 0)).unwrap();
    assert_eq!(orchestrator.catalog().len(), 5);
    assert_eq!(orchestrator.progress_len(), 5 * 3);
}
