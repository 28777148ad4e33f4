use crate::helpers::{Failure, ScriptedBackend, config, cpu_only_config, two_dense_catalog};
use embed_bench::backend::Device;
use embed_bench::report::ReportDataset;
use embed_bench::{BenchConfig, BenchmarkOrchestrator};
use indicatif::ProgressBar;

#[test]
fn load_failure_skips_only_that_model() {
    let backend = ScriptedBackend::cpu_only().failing("test/mini-a", None, Failure::Load);
    let config = cpu_only_config(4, 1);
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    let pb = ProgressBar::hidden();
    pb.set_length(orchestrator.progress_len());

    let results = orchestrator.run(&pb);
    assert_eq!(results.len(), 3);
    assert!(results.results().iter().all(|r| r.model_id == "test/base-b"));
    assert_eq!(pb.position(), pb.length().unwrap());
}

#[test]
fn timing_failure_mid_unit_keeps_progress_exact() {
    // 1 warmup + 4 timed for "short", then the 2nd timed call of "medium" fails.
    let backend =
        ScriptedBackend::cpu_only().failing("test/base-b", None, Failure::EmbedCall(8));
    let config = cpu_only_config(4, 1);
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    let pb = ProgressBar::hidden();
    pb.set_length(orchestrator.progress_len());

    let results = orchestrator.run(&pb);
    // The partially timed unit contributes nothing.
    assert_eq!(results.len(), 3);
    assert!(results.results().iter().all(|r| r.model_id == "test/mini-a"));
    assert_eq!(pb.position(), 24);
    assert_eq!(pb.position(), pb.length().unwrap());
    assert_eq!(backend.live_handles.get(), 0);
}

#[test]
fn warmup_failure_is_isolated() {
    let backend = ScriptedBackend::cpu_only().failing("test/mini-a", None, Failure::EmbedCall(1));
    let config = cpu_only_config(2, 3);
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    let pb = ProgressBar::hidden();
    pb.set_length(orchestrator.progress_len());

    let results = orchestrator.run(&pb);
    assert_eq!(results.len(), 3);
    assert_eq!(pb.position(), pb.length().unwrap());
}

#[test]
fn accelerator_only_failure_leaves_cpu_rows_without_gpu_data() {
    let backend = ScriptedBackend::with_accelerator().failing(
        "test/mini-a",
        Some(Device::Cuda),
        Failure::Load,
    );
    let config = config(2, 0);
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    let pb = ProgressBar::hidden();
    pb.set_length(orchestrator.progress_len());

    let results = orchestrator.run(&pb);
    assert_eq!(results.len(), 9);
    assert_eq!(pb.position(), pb.length().unwrap());

    let dataset = ReportDataset::build(&results);
    assert_eq!(dataset.rows.len(), 6);
    for row in &dataset.rows {
        match row.model_id.as_str() {
            "test/mini-a" => {
                assert!(row.gpu.is_none());
                assert!(row.speedup().is_none());
            }
            _ => assert!(row.gpu.is_some()),
        }
    }
    // Group accelerator means still exist: one model per group has GPU data.
    assert!(dataset.by_query.iter().all(|a| a.stats.gpu_mean_ms.is_some()));
    let small = dataset.by_size.iter().find(|a| a.model_size == "small").unwrap();
    assert!(small.stats.gpu_mean_ms.is_none());
}

#[test]
fn every_unit_failing_still_completes_the_run() {
    let backend = ScriptedBackend::cpu_only()
        .failing("test/mini-a", None, Failure::Load)
        .failing("test/base-b", None, Failure::EmbedCall(2));
    let config = cpu_only_config(3, 0);
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    let pb = ProgressBar::hidden();
    pb.set_length(orchestrator.progress_len());

    let results = orchestrator.run(&pb);
    assert!(results.is_empty());
    assert_eq!(pb.position(), 18);

    let dataset = ReportDataset::build(&results);
    assert!(dataset.rows.is_empty());
    assert!(dataset.by_query.is_empty());
    assert!(dataset.by_size.is_empty());
}

#[test]
fn dry_run_load_failure_is_skipped() {
    let backend = ScriptedBackend::cpu_only().failing("test/base-b", None, Failure::Load);
    let config = BenchConfig {
        dry_run: true,
        ..cpu_only_config(1, 0)
    };
    let orchestrator =
        BenchmarkOrchestrator::with_catalog(&backend, &config, two_dense_catalog()).unwrap();
    let pb = ProgressBar::hidden();

    let results = orchestrator.run(&pb);
    assert_eq!(results.len(), 3);
    assert_eq!(pb.position(), 2);
}
