//! Control file layout for cpufreq and devfreq
//!
//! Knows where each control knob lives relative to a domain's directory.

use std::path::{Path, PathBuf};

/// Root of the per-core cpufreq directories
pub const DEFAULT_CPU_BASE: &str = "/sys/devices/system/cpu";

/// GPU devfreq directories in probe order
///
/// Different Jetson kernel revisions expose the GPU under different paths;
/// only one of them exists on a given board.
pub const DEFAULT_GPU_CANDIDATES: &[&str] = &[
    "/sys/devices/gpu.0/devfreq/17000000.gp10b",
    "/sys/devices/17000000.gp10b/devfreq/17000000.gp10b",
    "/sys/kernel/debug/bpmp/debug/clk/gpcclk/rate",
    "/sys/devices/platform/gpu.0/devfreq/gpu.0",
];

/// Jetson TX2 GPU steps in Hz, used when devfreq exposes no list
pub const JETSON_TX2_GPU_FREQUENCIES: &[u64] = &[
    76_800_000,
    153_600_000,
    230_400_000,
    307_200_000,
    384_000_000,
    460_800_000,
    537_600_000,
    614_400_000,
    691_200_000,
    768_000_000,
    844_800_000,
    921_600_000,
    998_400_000,
    1_075_200_000,
    1_152_000_000,
    1_228_800_000,
    1_267_200_000,
    1_300_500_000,
];

// cpufreq file names (relative to cpuN/cpufreq)
const CPU_AVAILABLE: &str = "scaling_available_frequencies";
const CPU_CURRENT: &str = "scaling_cur_freq";
const CPU_GOVERNOR: &str = "scaling_governor";
const CPU_SETSPEED: &str = "scaling_setspeed";

// devfreq file names (relative to the GPU directory)
const GPU_AVAILABLE: &str = "available_frequencies";
const GPU_CURRENT: &str = "cur_freq";
const GPU_GOVERNOR: &str = "governor";
const GPU_FREQ_TARGETS: &[&str] = &["userspace/freq", "min_freq", "max_freq"];

/// Control files of a single clock domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPaths {
    /// Directory the domain was bound to
    pub dir: PathBuf,
    /// Whitespace-separated list of legal steps
    pub available: PathBuf,
    /// Current frequency
    pub current: PathBuf,
    /// Current governor (read and write)
    pub governor: PathBuf,
    /// Frequency write targets, tried in order
    pub freq_targets: Vec<PathBuf>,
    /// Whether write targets must exist before a write is attempted
    pub probe_targets: bool,
}

impl DomainPaths {
    /// Layout of `cpuN/cpufreq` under `base`
    pub fn cpu(base: &Path, core: u32) -> Self {
        let dir = base.join(format!("cpu{}", core)).join("cpufreq");
        Self {
            available: dir.join(CPU_AVAILABLE),
            current: dir.join(CPU_CURRENT),
            governor: dir.join(CPU_GOVERNOR),
            freq_targets: vec![dir.join(CPU_SETSPEED)],
            probe_targets: false,
            dir,
        }
    }

    /// Layout of a devfreq directory
    pub fn gpu(dir: &Path) -> Self {
        Self {
            available: dir.join(GPU_AVAILABLE),
            current: dir.join(GPU_CURRENT),
            governor: dir.join(GPU_GOVERNOR),
            freq_targets: GPU_FREQ_TARGETS.iter().map(|f| dir.join(f)).collect(),
            probe_targets: true,
            dir: dir.to_path_buf(),
        }
    }
}

/// Parse a core index out of a `cpuN` directory name
///
/// Entries such as `cpufreq` or `cpuidle` are not cores.
pub fn parse_core_dir(name: &str) -> Option<u32> {
    let digits = name.strip_prefix("cpu")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
