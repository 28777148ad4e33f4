//! Terminal tables printed after a run.

use super::{ReportDataset, load_time_str, ms_or_na, or_unknown, short_model_name, speedup_or_na};
use crate::aggregate::GroupStats;

/// Column-aligned plain-text table. Numeric-looking cells are right-aligned.
struct TextTable {
    title: String,
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(title: impl Into<String>, headers: Vec<&'static str>) -> Self {
        Self {
            title: title.into(),
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self, out: &mut String) {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i).map(String::len))
                    .chain([h.len()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);

        out.push_str(&format!("\n{}\n", self.title));
        out.push_str(&format!("{}\n", "=".repeat(total.max(self.title.len()))));
        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{h:<w$}"))
            .collect();
        out.push_str(&format!("{}\n", header.join(" | ").trim_end()));
        out.push_str(&format!("{}\n", "-".repeat(total)));
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| {
                    if looks_numeric(c) {
                        format!("{c:>w$}")
                    } else {
                        format!("{c:<w$}")
                    }
                })
                .collect();
            out.push_str(&format!("{}\n", cells.join(" | ").trim_end()));
        }
    }
}

fn looks_numeric(cell: &str) -> bool {
    cell.trim_end_matches(['x', 's', 'm'])
        .parse::<f64>()
        .is_ok()
}

fn group_table(title: &str, key: &'static str, with_gpu: bool) -> TextTable {
    let mut headers = vec![key, "CPU Mean", "CPU P50", "CPU P95"];
    if with_gpu {
        headers.extend(["GPU Mean", "GPU P50", "GPU P95", "Speedup"]);
    }
    TextTable::new(title, headers)
}

fn group_row(label: &str, s: &GroupStats, with_gpu: bool) -> Vec<String> {
    let mut row = vec![
        label.to_owned(),
        format!("{:.2}", s.cpu_mean_ms),
        format!("{:.2}", s.cpu_p50_ms),
        format!("{:.2}", s.cpu_p95_ms),
    ];
    if with_gpu {
        row.extend([
            ms_or_na(s.gpu_mean_ms),
            ms_or_na(s.gpu_p50_ms),
            ms_or_na(s.gpu_p95_ms),
            speedup_or_na(s.speedup()),
        ]);
    }
    row
}

/// Render the model table and, unless the run was a dry run, the comparison
/// and aggregation tables.
pub fn render_console(dataset: &ReportDataset<'_>) -> String {
    let with_gpu = dataset.results.gpu_available;
    let hw = &dataset.results.hardware;
    let mut out = String::new();

    out.push_str("Hardware\n");
    out.push_str(&format!("  CPU: {}\n", or_unknown(hw.cpu_model.as_deref())));
    out.push_str(&format!(
        "  CPU Cores/Threads: {}/{}\n",
        or_unknown(hw.cpu_cores),
        or_unknown(hw.cpu_threads)
    ));
    if let Some(ram) = hw.ram_gb {
        out.push_str(&format!("  RAM: {ram:.1} GB\n"));
    }
    if let Some(gpu) = &hw.gpu_model {
        out.push_str(&format!("  GPU: {gpu} (CUDA {})\n", or_unknown(hw.cuda_version.as_deref())));
    }

    let mut models = TextTable::new(
        "Model Information",
        vec!["Model", "Size", "Params", "Dim", "Max Seq", "Load", "Type"],
    );
    for row in dataset.distinct_models() {
        models.push(vec![
            short_model_name(&row.model_id).to_owned(),
            row.size_label.clone(),
            or_unknown(row.params_str()),
            or_unknown(row.embedding_dim),
            or_unknown(row.max_seq_length),
            load_time_str(row.cpu_load_time_ms),
            or_unknown(row.model_type.as_deref()),
        ]);
    }
    models.render(&mut out);

    if dataset.results.settings.dry_run {
        out.push_str("\nDry run complete - no timing data collected\n");
        return out;
    }

    let mut headers = vec!["Model", "Size", "Query", "CPU Mean", "CPU P50", "CPU P95"];
    if with_gpu {
        headers.extend(["GPU Mean", "GPU P50", "GPU P95", "Speedup"]);
    }
    let mut comparison = TextTable::new("CPU vs GPU Comparison (ms)", headers);
    for row in &dataset.rows {
        let mut cells = vec![
            short_model_name(&row.model_id).to_owned(),
            row.size_label.clone(),
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
        comparison.push(cells);
    }
    comparison.render(&mut out);

    let mut by_query = group_table("Aggregated by Query Size (ms, avg across models)", "Query", with_gpu);
    for agg in &dataset.by_query {
        by_query.push(group_row(agg.query_length.label(), &agg.stats, with_gpu));
    }
    by_query.render(&mut out);

    let mut by_size = group_table("Aggregated by Model Size (ms, avg across queries)", "Size", with_gpu);
    for agg in &dataset.by_size {
        by_size.push(group_row(&agg.model_size, &agg.stats, with_gpu));
    }
    by_size.render(&mut out);

    out
}
