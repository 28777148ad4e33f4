//! Best-effort hardware snapshot for benchmark reports.
//!
//! Every probe is independent: a missing file, a failed command, or an absent
//! GPU leaves that one field `None`. Detection never fails.

use crate::backend::onnx::RUNTIME_VERSION;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::process::Command;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    pub cpu_model: Option<String>,
    /// Physical cores.
    pub cpu_cores: Option<usize>,
    /// Logical CPUs.
    pub cpu_threads: Option<usize>,
    pub ram_gb: Option<f64>,
    pub gpu_model: Option<String>,
    pub gpu_memory_gb: Option<f64>,
    pub gpu_driver_version: Option<String>,
    pub cuda_version: Option<String>,
    pub runtime_version: Option<String>,
}

impl HardwareInfo {
    pub fn detect() -> Self {
        let cpu_threads = std::thread::available_parallelism()
            .ok()
            .map(std::num::NonZeroUsize::get);
        let cpu = CpuSummary::detect();
        let gpu = detect_nvidia_gpu();

        Self {
            cpu_model: cpu.model,
            cpu_cores: cpu.physical_cores.or(cpu_threads),
            cpu_threads,
            ram_gb: total_ram_bytes().map(|b| b as f64 / 1024.0_f64.powi(3)),
            gpu_model: gpu.as_ref().map(|g| g.name.clone()),
            gpu_memory_gb: gpu.as_ref().and_then(|g| g.memory_mib).map(|m| m / 1024.0),
            gpu_driver_version: gpu.as_ref().and_then(|g| g.driver_version.clone()),
            cuda_version: gpu.as_ref().and_then(|_| detect_cuda_version()),
            runtime_version: Some(RUNTIME_VERSION.to_owned()),
        }
    }
}

/// Trimmed stdout of a successful command; `None` on failure or empty output.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(program).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    Some(text.trim().to_owned()).filter(|t| !t.is_empty())
}

fn sysctl(key: &str) -> Option<String> {
    command_stdout("sysctl", &["-n", key])
}

fn total_ram_bytes() -> Option<u64> {
    if cfg!(target_os = "macos") {
        sysctl("hw.memsize")?.parse().ok()
    } else if cfg!(target_os = "linux") {
        meminfo_total_bytes(&std::fs::read_to_string("/proc/meminfo").ok()?)
    } else {
        None
    }
}

/// `MemTotal` from `/proc/meminfo`, converted from kB.
fn meminfo_total_bytes(meminfo: &str) -> Option<u64> {
    meminfo
        .lines()
        .find_map(|line| line.strip_prefix("MemTotal:"))
        .and_then(|rest| rest.split_whitespace().next()?.parse::<u64>().ok())
        .map(|kb| kb.saturating_mul(1024))
}

#[derive(Debug, Default, PartialEq)]
struct CpuSummary {
    model: Option<String>,
    physical_cores: Option<usize>,
}

impl CpuSummary {
    fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                model: sysctl("machdep.cpu.brand_string"),
                physical_cores: sysctl("hw.physicalcpu").and_then(|s| s.parse().ok()),
            }
        } else if cfg!(target_os = "linux") {
            std::fs::read_to_string("/proc/cpuinfo")
                .map(|c| Self::from_cpuinfo(&c))
                .unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// One pass over `/proc/cpuinfo`: the first `model name`, and physical
    /// cores as distinct `(physical id, core id)` pairs.
    fn from_cpuinfo(cpuinfo: &str) -> Self {
        let mut model = None;
        let mut cores = HashSet::new();
        for block in cpuinfo.split("\n\n") {
            let mut socket = None;
            let mut core = None;
            for (key, value) in block
                .lines()
                .filter_map(|l| l.split_once(':'))
                .map(|(k, v)| (k.trim(), v.trim()))
            {
                match key {
                    "model name" if model.is_none() && !value.is_empty() => {
                        model = Some(value.to_owned());
                    }
                    "physical id" => socket = Some(value),
                    "core id" => core = Some(value),
                    _ => {}
                }
            }
            if let (Some(s), Some(c)) = (socket, core) {
                cores.insert((s, c));
            }
        }
        Self {
            model,
            physical_cores: (!cores.is_empty()).then_some(cores.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct GpuQuery {
    name: String,
    memory_mib: Option<f64>,
    driver_version: Option<String>,
}

fn detect_nvidia_gpu() -> Option<GpuQuery> {
    let out = command_stdout(
        "nvidia-smi",
        &[
            "--query-gpu=name,memory.total,driver_version",
            "--format=csv,noheader,nounits",
        ],
    )?;
    parse_gpu_query(&out)
}

/// Parse the first line of `nvidia-smi --query-gpu=name,memory.total,driver_version`.
fn parse_gpu_query(output: &str) -> Option<GpuQuery> {
    let line = output.lines().next()?;
    let mut fields = line.split(',').map(str::trim);
    let name = fields.next().filter(|s| !s.is_empty())?.to_owned();
    let memory_mib = fields.next().and_then(|s| s.parse::<f64>().ok());
    let driver_version = fields.next().filter(|s| !s.is_empty()).map(str::to_owned);
    Some(GpuQuery {
        name,
        memory_mib,
        driver_version,
    })
}

fn detect_cuda_version() -> Option<String> {
    parse_cuda_version(&command_stdout("nvidia-smi", &[])?)
}

/// Extract `12.4` from the `CUDA Version: 12.4` field of the nvidia-smi banner.
fn parse_cuda_version(banner: &str) -> Option<String> {
    let (_, rest) = banner.split_once("CUDA Version:")?;
    let version = rest.split_whitespace().next()?.trim_end_matches('|');
    if version.is_empty() {
        None
    } else {
        Some(version.to_owned())
    }
}
