//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - casebench.toml (default configuration)
//! - casebench.local.toml (git-ignored local overrides)
//! - Environment variables (`CASEBENCH_*` prefix)
//!
//! ## Example
//!
//! ```toml
//! # casebench.toml
//! [executor]
//! workers = 8
//! repetitions = 5
//!
//! [checkpoint]
//! dir = "./checkpoints"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! CASEBENCH_EXECUTOR__WORKERS=4
//! CASEBENCH_CHECKPOINT__DIR=/tmp/checkpoints
//! ```

use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Top-level configuration for the reference CLI driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub executor: ExecutorSettings,
    pub checkpoint: CheckpointSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Executor tuning: worker count, repetitions, seeding, and timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorSettings {
    /// 0 = use the logical CPU count.
    #[serde(default)]
    pub workers: u32,

    #[serde(default = "default_repetitions")]
    pub repetitions: u32,

    #[serde(default = "default_seed_base")]
    pub seed_base: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default)]
    pub memory: MemoryConfig,
}

/// RSS thresholds in bytes at which the memory monitor logs a warning,
/// evicts cache entries, or persists and exits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_warning_bytes")]
    pub warning_bytes: u64,
    #[serde(default = "default_critical_bytes")]
    pub critical_bytes: u64,
    #[serde(default = "default_emergency_bytes")]
    pub emergency_bytes: u64,
}

/// Where checkpoint shards are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointSettings {
    pub dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_repetitions() -> u32 {
    1
}
fn default_seed_base() -> u64 {
    42
}
fn default_timeout_ms() -> u64 {
    300_000
}
fn default_cache_capacity() -> usize {
    32
}
fn default_warning_bytes() -> u64 {
    1 << 30
}
fn default_critical_bytes() -> u64 {
    2 << 30
}
fn default_emergency_bytes() -> u64 {
    3 << 30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Merges in order:
    /// 1. `casebench.toml` (base configuration)
    /// 2. `casebench.local.toml` (local overrides, git-ignored)
    /// 3. Environment variables (`CASEBENCH_*` prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Self::default_figment())
            .merge(Toml::file("casebench.toml"))
            .merge(Toml::file("casebench.local.toml"))
            .merge(Env::prefixed("CASEBENCH_").split("__"))
            .extract()
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::from(Self::default_figment())
            .merge(Toml::file(path))
            .merge(Env::prefixed("CASEBENCH_").split("__"))
            .extract()
    }

    fn default_figment() -> Figment {
        Figment::from(figment::providers::Serialized::defaults(Config::default()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            executor: ExecutorSettings {
                workers: 0,
                repetitions: default_repetitions(),
                seed_base: default_seed_base(),
                timeout_ms: default_timeout_ms(),
                cache_capacity: default_cache_capacity(),
                memory: MemoryConfig::default(),
            },
            checkpoint: CheckpointSettings {
                dir: PathBuf::from("./checkpoints"),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            warning_bytes: default_warning_bytes(),
            critical_bytes: default_critical_bytes(),
            emergency_bytes: default_emergency_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.executor.repetitions, 1);
        assert_eq!(config.executor.seed_base, 42);
        assert_eq!(config.checkpoint.dir, PathBuf::from("./checkpoints"));
    }

    #[test]
    fn config_serialization_round_trips_sections() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[executor]"));
        assert!(toml_str.contains("[checkpoint]"));
    }
}
