use crate::helpers::{empty_results, timing};
use embed_bench::backend::Device;
use embed_bench::catalog::QueryLength;
use embed_bench::report::{self, ReportDataset};

const EPS: f64 = 1e-9;

#[test]
fn group_means_are_means_of_row_means() {
    let mut results = empty_results(false);
    // Unequal sample counts: a pooled mean would give 3.5, not 4.0.
    results.add(timing("org/a", "small", QueryLength::Short, Device::Cpu, &[2.0]));
    results.add(timing("org/b", "medium", QueryLength::Short, Device::Cpu, &[6.0, 6.0, 6.0]));
    results.add(timing("org/a", "small", QueryLength::Long, Device::Cpu, &[10.0, 20.0]));

    let dataset = ReportDataset::build(&results);
    let short = dataset
        .by_query
        .iter()
        .find(|a| a.query_length == QueryLength::Short)
        .unwrap();
    assert!((short.stats.cpu_mean_ms - 4.0).abs() < EPS);
    assert!(short.stats.gpu_mean_ms.is_none());
    assert!(short.stats.speedup().is_none());

    let small = dataset.by_size.iter().find(|a| a.model_size == "small").unwrap();
    // Row means 2.0 and 15.0.
    assert!((small.stats.cpu_mean_ms - 8.5).abs() < EPS);

    // Query sizes without rows are omitted.
    let queries: Vec<_> = dataset.by_query.iter().map(|a| a.query_length).collect();
    assert_eq!(queries, vec![QueryLength::Short, QueryLength::Long]);
}

#[test]
fn unknown_size_labels_sort_after_known_ones() {
    let mut results = empty_results(false);
    results.add(timing("org/z", "zeta-custom", QueryLength::Short, Device::Cpu, &[1.0]));
    results.add(timing("org/y", "alpha-custom", QueryLength::Short, Device::Cpu, &[1.0]));
    results.add(timing("org/l", "large", QueryLength::Short, Device::Cpu, &[1.0]));
    results.add(timing("org/s", "small", QueryLength::Short, Device::Cpu, &[1.0]));

    let dataset = ReportDataset::build(&results);
    let rows: Vec<_> = dataset.rows.iter().map(|r| r.size_label.as_str()).collect();
    assert_eq!(rows, vec!["small", "large", "alpha-custom", "zeta-custom"]);
    let sizes: Vec<_> = dataset.by_size.iter().map(|a| a.model_size.as_str()).collect();
    assert_eq!(sizes, rows);
}

#[test]
fn gpu_speedup_and_group_speedup_from_aggregated_means() {
    let mut results = empty_results(true);
    results.add(timing("org/a", "small", QueryLength::Short, Device::Cpu, &[10.0]));
    results.add(timing("org/a", "small", QueryLength::Short, Device::Cuda, &[2.0]));
    results.add(timing("org/b", "medium", QueryLength::Short, Device::Cpu, &[30.0]));
    results.add(timing("org/b", "medium", QueryLength::Short, Device::Cuda, &[6.0]));

    let dataset = ReportDataset::build(&results);
    assert!(dataset.rows.iter().all(|r| (r.speedup().unwrap() - 5.0).abs() < EPS));

    let short = &dataset.by_query[0];
    assert!((short.stats.cpu_mean_ms - 20.0).abs() < EPS);
    assert!((short.stats.gpu_mean_ms.unwrap() - 4.0).abs() < EPS);
    assert!((short.stats.speedup().unwrap() - 5.0).abs() < EPS);
}

#[test]
fn json_uses_null_for_unknown_values() {
    let mut results = empty_results(false);
    results.add(timing("org/a", "small", QueryLength::Medium, Device::Cpu, &[1.0, 3.0]));

    let dataset = ReportDataset::build(&results);
    let json: serde_json::Value = serde_json::from_str(&report::render_json(&dataset).unwrap()).unwrap();

    let row = &json["comparison"][0];
    assert_eq!(row["model"], "org/a");
    assert_eq!(row["query_length"], "medium");
    assert_eq!(row["cpu_mean_ms"], 2.0);
    assert!(row["gpu_mean_ms"].is_null());
    assert!(row["speedup"].is_null());
    assert!(row["params"].is_null());
    assert!(row["embedding_dim"].is_null());
    assert!(json["aggregations_by_query_size"][0]["avg_speedup"].is_null());
    assert_eq!(json["aggregations_by_model_size"][0]["model_size"], "small");
    assert_eq!(json["config"]["gpu_available"], false);
    assert_eq!(json["config"]["mode"], "quick");
    assert!(json["hardware"].is_object());
}

#[test]
fn csv_leaves_unknown_fields_empty() {
    let mut results = empty_results(true);
    results.add(timing("org/a", "small", QueryLength::Short, Device::Cpu, &[4.0]));
    results.add(timing("org/a", "small", QueryLength::Short, Device::Cuda, &[1.0]));
    results.add(timing("org/b", "medium", QueryLength::Short, Device::Cpu, &[2.0]));

    let dataset = ReportDataset::build(&results);
    let csv = report::render_csv(&dataset).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], report::csv::HEADER.join(","));
    assert!(lines[1].starts_with("org/a,small,"));
    assert!(lines[1].ends_with(",4.00"));
    assert!(lines[2].starts_with("org/b,medium,"));
    assert!(lines[2].ends_with(",,,,,"));
    assert!(lines.iter().all(|l| l.split(',').count() == report::csv::HEADER.len()));
}

#[test]
fn markdown_gpu_columns_follow_availability() {
    let mut cpu_only = empty_results(false);
    cpu_only.add(timing("org/a", "small", QueryLength::Short, Device::Cpu, &[1.0]));
    let md = report::render_markdown(&ReportDataset::build(&cpu_only));
    assert!(md.starts_with("# Embedding Benchmark Results"));
    assert!(md.contains("- **GPU Available:** No"));
    assert!(!md.contains("GPU Mean"));

    let mut with_gpu = empty_results(true);
    with_gpu.add(timing("org/a", "small", QueryLength::Short, Device::Cpu, &[1.0]));
    let md = report::render_markdown(&ReportDataset::build(&with_gpu));
    assert!(md.contains("- **GPU Available:** Yes"));
    assert!(md.contains("Avg Speedup"));
    // Accelerator slot present but empty for this row.
    assert!(md.contains("| N/A | N/A | N/A | N/A |"));
}

#[test]
fn empty_results_render_everywhere() {
    let results = empty_results(false);
    let dataset = ReportDataset::build(&results);
    assert_eq!(
        report::render_csv(&dataset).unwrap().lines().count(),
        1
    );
    let json: serde_json::Value = serde_json::from_str(&report::render_json(&dataset).unwrap()).unwrap();
    assert!(json["comparison"].as_array().unwrap().is_empty());
    assert!(report::render_markdown(&dataset).contains("## Models"));
    assert!(report::render_console(&dataset).contains("Model Information"));
}
