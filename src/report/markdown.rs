//! Markdown report.

use super::{
    ReportDataset, load_time_str, ms_or_na, or_unknown, runtime_str, short_model_name,
    speedup_or_na,
};
use crate::aggregate::GroupStats;

/// Append a pipe table. Separator dashes span each header plus its padding.
pub(crate) fn push_table(out: &mut String, headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) {
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    let dashes: Vec<String> = headers.iter().map(|h| "-".repeat(h.len() + 2)).collect();
    out.push_str(&format!("|{}|\n", dashes.join("|")));
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
}

fn group_cells(label: &str, stats: &GroupStats, with_gpu: bool) -> Vec<String> {
    let mut cells = vec![
        label.to_owned(),
        format!("{:.2}", stats.cpu_mean_ms),
        format!("{:.2}", stats.cpu_p50_ms),
        format!("{:.2}", stats.cpu_p95_ms),
    ];
    if with_gpu {
        cells.extend([
            ms_or_na(stats.gpu_mean_ms),
            ms_or_na(stats.gpu_p50_ms),
            ms_or_na(stats.gpu_p95_ms),
            speedup_or_na(stats.speedup()),
        ]);
    }
    cells
}

fn group_headers(key: &'static str, with_gpu: bool) -> Vec<&'static str> {
    let mut headers = vec![key, "CPU Mean", "CPU P50", "CPU P95"];
    if with_gpu {
        headers.extend(["GPU Mean", "GPU P50", "GPU P95", "Avg Speedup"]);
    }
    headers
}

/// Render the full narrative report. Accelerator columns appear only when
/// the run had an accelerator available.
pub fn render_markdown(dataset: &ReportDataset<'_>) -> String {
    let results = dataset.results;
    let hw = &results.hardware;
    let with_gpu = results.gpu_available;
    let mut md = String::new();

    md.push_str("# Embedding Benchmark Results\n\n");
    md.push_str(&format!("**Run Date:** {}  \n", results.started_at.format("%Y-%m-%d %H:%M:%S UTC")));
    md.push_str(&format!("**Total Runtime:** {}\n\n", runtime_str(results.total_runtime_seconds)));

    md.push_str("## Hardware\n\n");
    md.push_str(&format!("- **CPU:** {}\n", or_unknown(hw.cpu_model.as_deref())));
    md.push_str(&format!(
        "- **CPU Cores/Threads:** {}/{}\n",
        or_unknown(hw.cpu_cores),
        or_unknown(hw.cpu_threads)
    ));
    md.push_str(&format!("- **RAM:** {}\n", gb(hw.ram_gb)));
    if let Some(gpu) = &hw.gpu_model {
        md.push_str(&format!("- **GPU:** {gpu}\n"));
        md.push_str(&format!("- **GPU Memory:** {}\n", gb(hw.gpu_memory_gb)));
        md.push_str(&format!("- **GPU Driver:** {}\n", or_unknown(hw.gpu_driver_version.as_deref())));
        md.push_str(&format!("- **CUDA:** {}\n", or_unknown(hw.cuda_version.as_deref())));
    }
    md.push_str(&format!("- **Runtime:** {}\n\n", or_unknown(hw.runtime_version.as_deref())));

    md.push_str("## Configuration\n\n");
    md.push_str(&format!("- **Mode:** {}\n", results.settings.mode.as_str()));
    md.push_str(&format!("- **Iterations:** {}\n", results.settings.iterations));
    md.push_str(&format!("- **Warmup:** {}\n", results.settings.warmup));
    md.push_str(&format!("- **GPU Available:** {}\n", if with_gpu { "Yes" } else { "No" }));
    if results.settings.dry_run {
        md.push_str("- **Dry Run:** Yes (no timing data)\n");
    }

    md.push_str("\n## Models\n\n");
    push_table(
        &mut md,
        &["Model", "Size", "Params", "Dim", "Max Seq", "Load Time", "Type"],
        dataset.distinct_models().into_iter().map(|row| {
            vec![
                short_model_name(&row.model_id).to_owned(),
                row.size_label.clone(),
                or_unknown(row.params_str()),
                or_unknown(row.embedding_dim),
                or_unknown(row.max_seq_length),
                load_time_str(row.cpu_load_time_ms),
                or_unknown(row.model_type.as_deref()),
            ]
        }),
    );

    md.push_str("\n## CPU vs GPU Comparison - all times in ms (per model + query)\n\n");
    let mut headers = vec!["Model", "Size", "Params", "Dim", "Query", "CPU Mean", "CPU P50", "CPU P95"];
    if with_gpu {
        headers.extend(["GPU Mean", "GPU P50", "GPU P95", "Speedup"]);
    }
    push_table(
        &mut md,
        &headers,
        dataset.rows.iter().map(|row| {
            let mut cells = vec![
                short_model_name(&row.model_id).to_owned(),
                row.size_label.clone(),
                or_unknown(row.params_str()),
                or_unknown(row.embedding_dim),
                row.query_length.to_string(),
                format!("{:.2}", row.cpu.mean_ms),
                format!("{:.2}", row.cpu.p50_ms),
                format!("{:.2}", row.cpu.p95_ms),
            ];
            if with_gpu {
                cells.extend([
                    ms_or_na(row.gpu.map(|g| g.mean_ms)),
                    ms_or_na(row.gpu.map(|g| g.p50_ms)),
                    ms_or_na(row.gpu.map(|g| g.p95_ms)),
                    speedup_or_na(row.speedup()),
                ]);
            }
            cells
        }),
    );

    md.push_str("\n## Aggregated by Query Size - all times in ms (avg across all models)\n\n");
    push_table(
        &mut md,
        &group_headers("Query Size", with_gpu),
        dataset
            .by_query
            .iter()
            .map(|agg| group_cells(agg.query_length.label(), &agg.stats, with_gpu)),
    );

    md.push_str("\n## Aggregated by Model Size - all times in ms (avg across all query lengths)\n\n");
    push_table(
        &mut md,
        &group_headers("Model Size", with_gpu),
        dataset
            .by_size
            .iter()
            .map(|agg| group_cells(&agg.model_size, &agg.stats, with_gpu)),
    );

    md
}

fn gb(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_owned(), |v| format!("{v:.1} GB"))
}
