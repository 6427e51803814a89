//! Per-worker memory discipline.
//!
//! Atomic threshold counters over per-worker RSS sampling. Reading real RSS
//! needs a platform call, so the sampler is injected — constructed once and
//! invoked cooperatively — which lets tests fake memory pressure without
//! touching `/proc`.

use std::sync::Arc;

/// One point-in-time memory reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    pub rss_bytes: u64,
    pub heap_bytes: u64,
}

pub type MemorySampler = Arc<dyn Fn() -> MemorySample + Send + Sync>;

/// Severity band a sample falls into relative to the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLevel {
    Normal,
    Warning,
    Critical,
    Emergency,
}

/// Warning/critical/emergency RSS thresholds, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct MemoryThresholds {
    pub warning_bytes: u64,
    pub critical_bytes: u64,
    pub emergency_bytes: u64,
}

impl Default for MemoryThresholds {
    fn default() -> Self {
        MemoryThresholds {
            warning_bytes: 1 << 30,     // 1 GiB
            critical_bytes: 2 << 30,    // 2 GiB
            emergency_bytes: 3 << 30,   // 3 GiB
        }
    }
}

/// Samples and classifies a worker's memory usage against configured
/// thresholds. Stateless beyond the injected sampler and thresholds — the
/// worker loop decides what to do with each classification.
pub struct MemoryMonitor {
    sampler: MemorySampler,
    thresholds: MemoryThresholds,
}

impl MemoryMonitor {
    pub fn new(sampler: MemorySampler, thresholds: MemoryThresholds) -> Self {
        MemoryMonitor { sampler, thresholds }
    }

    /// Build a monitor using the production sampler (`/proc/self/status`
    /// on Linux, a zero sample elsewhere).
    pub fn with_default_sampler(thresholds: MemoryThresholds) -> Self {
        MemoryMonitor::new(Arc::new(default_sampler), thresholds)
    }

    pub fn sample(&self) -> MemorySample {
        (self.sampler)()
    }

    pub fn classify(&self, sample: MemorySample) -> MemoryLevel {
        if sample.rss_bytes >= self.thresholds.emergency_bytes {
            MemoryLevel::Emergency
        } else if sample.rss_bytes >= self.thresholds.critical_bytes {
            MemoryLevel::Critical
        } else if sample.rss_bytes >= self.thresholds.warning_bytes {
            MemoryLevel::Warning
        } else {
            MemoryLevel::Normal
        }
    }

    pub fn check(&self) -> MemoryLevel {
        self.classify(self.sample())
    }
}

#[cfg(target_os = "linux")]
fn default_sampler() -> MemorySample {
    use std::fs;

    let Ok(status) = fs::read_to_string("/proc/self/status") else {
        return MemorySample::default();
    };

    let mut rss_bytes = 0u64;
    for line in status.lines() {
        if let Some(kb) = line.strip_prefix("VmRSS:") {
            rss_bytes = kb
                .trim()
                .trim_end_matches(" kB")
                .trim()
                .parse::<u64>()
                .unwrap_or(0)
                * 1024;
            break;
        }
    }
    MemorySample {
        rss_bytes,
        heap_bytes: 0,
    }
}

#[cfg(not(target_os = "linux"))]
fn default_sampler() -> MemorySample {
    MemorySample::default()
}
