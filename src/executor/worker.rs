//! Per-worker execution loop.
//!
//! Runs as a plain `std::thread::spawn` body — not a `rayon` task — because
//! each worker owns identity (`worker_index`), a private checkpoint shard,
//! and a private cache: an isolated unit of work with no shared mutable
//! state, best expressed with `std::thread::spawn` + `join` rather than a
//! data-parallel combinator.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use super::cache::CaseInputCache;
use super::error::{ExecutorError, ExecutorResult};
use super::memory::{MemoryLevel, MemoryMonitor};
use crate::checkpoint::{CheckpointError, CheckpointShard, CheckpointStore};
use crate::model::{
    Correctness, EvaluationResult, Metrics, Provenance, RunDescriptor, Sut, SutRunError,
};
use crate::registry::{CaseRegistry, SutRegistry};

/// Everything one worker needs that does not change across runs.
pub struct WorkerConfig {
    pub worker_index: u32,
    pub total_workers: u32,
    pub checkpoint_dir: PathBuf,
    pub config_hash: String,
    pub timeout: Duration,
    pub cache_capacity: usize,
}

/// Race a SUT's (opaque, synchronous) `run` call against a deadline on a
/// helper thread. `sut.run` cannot be instrumented from the inside, so true
/// preemption needs a second thread and a channel recv with timeout. A run
/// that exceeds its deadline leaves its helper thread running to completion
/// in the background; the result is discarded.
fn run_with_deadline(
    sut: Box<dyn Sut>,
    inputs: serde_json::Value,
    timeout: Duration,
) -> Result<crate::model::SutOutcome, SutRunError> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let outcome = sut.run(&inputs);
        let _ = tx.send(outcome);
    });

    match rx.recv_timeout(timeout) {
        Ok(outcome) => outcome,
        Err(_) => Err(SutRunError(format!(
            "run exceeded timeout of {timeout:?}"
        ))),
    }
}

/// Execute every descriptor in `assigned` not already completed, persisting
/// the shard after each run. Returns the final shard. Stops early (without
/// error) if `stop` is observed set between runs, or if memory crosses the
/// emergency threshold.
#[allow(clippy::too_many_arguments)]
pub fn run_worker(
    config: &WorkerConfig,
    assigned: &[RunDescriptor],
    sut_registry: &SutRegistry,
    case_registry: &CaseRegistry,
    memory_monitor: &MemoryMonitor,
    stop: &Arc<AtomicBool>,
) -> ExecutorResult<CheckpointShard> {
    let store = CheckpointStore::new(&config.checkpoint_dir, config.worker_index);

    let mut shard = match store.load()? {
        Some(existing) if existing.config_hash == config.config_hash => existing,
        Some(stale) => {
            let incompatible = CheckpointError::Incompatible {
                expected: config.config_hash.clone(),
                found: stale.config_hash.clone(),
            };
            warn!(
                worker_index = config.worker_index,
                error = %incompatible,
                "checkpoint_config_mismatch_clearing_shard"
            );
            store.clear();
            CheckpointShard::new(
                config.config_hash.clone(),
                config.worker_index,
                config.total_workers,
                assigned.len() as u64,
            )
        }
        None => CheckpointShard::new(
            config.config_hash.clone(),
            config.worker_index,
            config.total_workers,
            assigned.len() as u64,
        ),
    };

    let mut cache = CaseInputCache::new(config.cache_capacity);

    for run in assigned {
        if stop.load(Ordering::Relaxed) {
            debug!(worker_index = config.worker_index, "worker_stop_observed");
            break;
        }
        if shard.is_completed(&run.run_id) {
            continue;
        }

        match memory_monitor.check() {
            MemoryLevel::Emergency => {
                warn!(worker_index = config.worker_index, "memory_emergency_exiting");
                store.save(&shard)?;
                return Ok(shard);
            }
            MemoryLevel::Critical => {
                if cache.contains(&run.case_id) {
                    warn!(worker_index = config.worker_index, "memory_critical");
                } else {
                    warn!(
                        worker_index = config.worker_index,
                        case_id = %run.case_id,
                        "memory_critical_skipping_new_case_load"
                    );
                    cache.evict_oldest();
                    continue;
                }
            }
            MemoryLevel::Warning => {
                warn!(worker_index = config.worker_index, "memory_warning");
            }
            MemoryLevel::Normal => {}
        }

        let sut_spec = sut_registry
            .get(&run.sut_id)
            .ok_or_else(|| ExecutorError::SutNotFound(run.sut_id.clone()))?;
        let case_spec = case_registry
            .get_spec(&run.case_id)
            .ok_or_else(|| ExecutorError::CaseNotFound(run.case_id.clone()))?;

        let case_id = run.case_id.clone();
        cache.get_or_load(&case_id, || case_registry.get_input(&case_id))?;
        let inputs = case_registry.get_inputs(&run.case_id)?;

        let sut = sut_registry.create(&run.sut_id, Some(&sut_spec.config_defaults))?;

        let started_at = Utc::now();
        let outcome = run_with_deadline(sut, inputs, config.timeout);
        let ended_at = Utc::now();
        let memory_bytes = Some(memory_monitor.sample().rss_bytes);

        let (correctness, outputs, metrics) = match outcome {
            Ok(outcome) => (
                Correctness {
                    expected_exists: outcome.matches_expected.is_some(),
                    produced_output: true,
                    valid: outcome.valid,
                    matches_expected: outcome.matches_expected,
                },
                outcome.outputs,
                Metrics {
                    numeric: outcome.numeric,
                },
            ),
            Err(err) => (
                Correctness {
                    expected_exists: false,
                    produced_output: false,
                    valid: false,
                    matches_expected: None,
                },
                serde_json::json!({ "error": err.0 }),
                Metrics::default(),
            ),
        };

        let result = EvaluationResult {
            run: run.clone(),
            sut_role: sut_spec.role,
            case_class: case_spec.case_class.clone(),
            correctness,
            outputs,
            metrics,
            provenance: Provenance {
                platform: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                runtime_version: env!("CARGO_PKG_VERSION").to_string(),
                started_at,
                ended_at,
                memory_bytes,
            },
        };

        shard.record(result);
        store.save(&shard)?;
    }

    Ok(shard)
}
