//! Parallel, sharded, crash-resumable run executor.
//!
//! Ties the planner, sharding function, memory monitor, per-worker cache,
//! worker loop, and merge phase together. Owns the process-wide stop flag,
//! the same `Arc<AtomicBool>` cancellation idiom `execution::timeout`'s
//! `QueryTimeout`/`CancelHandle` use, generalized here from a per-query
//! cooperative check to a cross-worker "finish current run, then exit"
//! signal.

mod cache;
mod error;
mod memory;
mod merge;
mod planner;
mod sharding;
mod worker;

pub use error::{ExecutorError, ExecutorResult};
pub use memory::{MemoryLevel, MemoryMonitor, MemorySample, MemorySampler, MemoryThresholds};
pub use merge::MergeReport;
pub use planner::ExperimentConfig;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::model::{EvaluationResult, RunDescriptor};
use crate::registry::{CaseRegistry, SutRegistry};

/// Result of one complete `ParallelExecutor::run` invocation: the union of
/// every worker's completed results, plus anything planned-but-missing.
pub struct ExecutionReport {
    pub results: HashMap<String, EvaluationResult>,
    pub total_planned: u64,
    pub skipped: Vec<String>,
    pub config_hash: String,
}

pub struct ParallelExecutor {
    sut_registry: Arc<SutRegistry>,
    case_registry: Arc<CaseRegistry>,
    checkpoint_dir: PathBuf,
    workers: u32,
    repetitions: u32,
    seed_base: u64,
    timeout: Duration,
    cache_capacity: usize,
    memory_monitor: Arc<MemoryMonitor>,
    stop: Arc<AtomicBool>,
}

impl ParallelExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sut_registry: Arc<SutRegistry>,
        case_registry: Arc<CaseRegistry>,
        checkpoint_dir: PathBuf,
        workers: u32,
        repetitions: u32,
        seed_base: u64,
        timeout: Duration,
        cache_capacity: usize,
        memory_monitor: MemoryMonitor,
    ) -> Self {
        ParallelExecutor {
            sut_registry,
            case_registry,
            checkpoint_dir,
            workers: workers.max(1),
            repetitions,
            seed_base,
            timeout,
            cache_capacity,
            memory_monitor: Arc::new(memory_monitor),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle other code (e.g. a CLI signal handler) can use to request
    /// every worker to finish its current run and exit.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Plan, shard, execute, and merge one experiment over `sut_ids` x
    /// `case_ids`.
    pub fn run(&self, sut_ids: &[String], case_ids: &[String]) -> ExecutorResult<ExecutionReport> {
        let experiment = ExperimentConfig {
            sut_ids: sut_ids.to_vec(),
            case_ids: case_ids.to_vec(),
            repetitions: self.repetitions,
            seed_base: self.seed_base,
            timeout_ms: self.timeout.as_millis() as u64,
        };
        let config_hash = experiment.config_hash()?;

        let planned = planner::plan(
            sut_ids,
            case_ids,
            self.repetitions,
            self.seed_base,
            &config_hash,
        )?;
        let total_planned = planned.len() as u64;

        info!(
            total_planned,
            workers = self.workers,
            config_hash = %config_hash,
            "experiment_planned"
        );

        let mut by_worker: Vec<Vec<RunDescriptor>> = vec![Vec::new(); self.workers as usize];
        for run in &planned {
            let idx = sharding::worker_for(&run.run_id, self.workers) as usize;
            by_worker[idx].push(run.clone());
        }

        let handles: Vec<_> = by_worker
            .into_iter()
            .enumerate()
            .map(|(worker_index, assigned)| {
                let config = worker::WorkerConfig {
                    worker_index: worker_index as u32,
                    total_workers: self.workers,
                    checkpoint_dir: self.checkpoint_dir.clone(),
                    config_hash: config_hash.clone(),
                    timeout: self.timeout,
                    cache_capacity: self.cache_capacity,
                };
                let sut_registry = Arc::clone(&self.sut_registry);
                let case_registry = Arc::clone(&self.case_registry);
                let memory_monitor = Arc::clone(&self.memory_monitor);
                let stop = Arc::clone(&self.stop);

                thread::Builder::new()
                    .name(format!("casebench-worker-{worker_index}"))
                    .spawn(move || {
                        worker::run_worker(
                            &config,
                            &assigned,
                            &sut_registry,
                            &case_registry,
                            &memory_monitor,
                            &stop,
                        )
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        let mut first_error = None;
        for handle in handles {
            match handle.join().expect("worker thread panicked") {
                Ok(_shard) => {}
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(_) => {}
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        let report = merge::merge(&self.checkpoint_dir, &config_hash, &planned)?;

        if !report.skipped.is_empty() {
            info!(skipped = report.skipped.len(), "experiment_runs_skipped");
        }

        Ok(ExecutionReport {
            results: report.results,
            total_planned,
            skipped: report.skipped,
            config_hash,
        })
    }
}

/// Default worker count: logical CPU count.
pub fn default_worker_count() -> u32 {
    num_cpus::get() as u32
}
