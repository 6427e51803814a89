//! Reference command-line driver.
//!
//! A thin binary wiring of the library pieces (registries, executor,
//! collector, aggregator, claim evaluator) into one command, using the
//! derive-based `clap::Parser` style.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::claims::ClaimEvaluator;
use crate::collector::ResultCollector;
use crate::config::Config;
use crate::errors::{CasebenchError, CasebenchResult};
use crate::executor::{
    default_worker_count, ExecutionReport, MemoryMonitor, MemoryThresholds, ParallelExecutor,
};
use crate::model::EvaluationClaim;
use crate::registry::{CaseRegistry, SutRegistry};

/// Exit code: all runs completed, every claim satisfied or violated.
pub const EXIT_OK: i32 = 0;
/// Exit code: at least one claim was violated.
pub const EXIT_CLAIM_VIOLATED: i32 = 1;
/// Exit code: a claim was inconclusive, or a planned run is missing from the merge.
pub const EXIT_INCONCLUSIVE_OR_INCOMPLETE: i32 = 2;
/// Exit code: fatal error (corruption, config mismatch, registry lookup failure).
pub const EXIT_FATAL: i32 = 3;

#[derive(Parser, Debug)]
#[command(name = "casebench")]
#[command(author, version, about = "Empirical evaluation harness for graph algorithms", long_about = None)]
pub struct Cli {
    /// Number of parallel workers (default: logical CPU count)
    #[arg(long)]
    pub workers: Option<u32>,

    /// Directory for checkpoint shards and result artifacts
    #[arg(long)]
    pub checkpoint_dir: Option<PathBuf>,

    /// Repetitions per (SUT, case) pair
    #[arg(long, default_value_t = 1)]
    pub repetitions: u32,

    /// Base seed for per-run seeding
    #[arg(long, default_value_t = 42)]
    pub seed_base: u64,

    /// Per-run SUT timeout in milliseconds
    #[arg(long, default_value_t = 300_000)]
    pub timeout_ms: u64,

    /// Path to a config file (overrides `casebench.toml` discovery)
    #[arg(long)]
    pub config: Option<String>,
}

/// Run one experiment end to end: plan, execute, merge, aggregate, evaluate
/// claims, and persist artifacts. Returns the process exit code (never
/// itself calls `std::process::exit`).
pub fn run(
    cli: &Cli,
    sut_registry: Arc<SutRegistry>,
    case_registry: Arc<CaseRegistry>,
    claims: &[EvaluationClaim],
) -> CasebenchResult<i32> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path).map_err(|e| CasebenchError::Config(e.to_string()))?,
        None => Config::load().unwrap_or_default(),
    };

    let workers = cli.workers.unwrap_or_else(|| {
        if config.executor.workers > 0 {
            config.executor.workers
        } else {
            default_worker_count()
        }
    });
    let checkpoint_dir = cli
        .checkpoint_dir
        .clone()
        .unwrap_or_else(|| config.checkpoint.dir.clone());
    let timeout = Duration::from_millis(cli.timeout_ms);

    let memory_monitor = MemoryMonitor::with_default_sampler(MemoryThresholds {
        warning_bytes: config.executor.memory.warning_bytes,
        critical_bytes: config.executor.memory.critical_bytes,
        emergency_bytes: config.executor.memory.emergency_bytes,
    });

    let executor = ParallelExecutor::new(
        Arc::clone(&sut_registry),
        Arc::clone(&case_registry),
        checkpoint_dir.clone(),
        workers,
        cli.repetitions,
        cli.seed_base,
        timeout,
        config.executor.cache_capacity,
        memory_monitor,
    );

    let sut_ids: Vec<String> = sut_registry.list().into_iter().map(|s| s.id).collect();
    let case_ids: Vec<String> = {
        let mut ids: Vec<String> = Vec::new();
        for class in case_registry.list_classes() {
            for case in case_registry.get_by_class(&class) {
                ids.push(case.case_id);
            }
        }
        ids
    };

    info!(workers, sut_count = sut_ids.len(), case_count = case_ids.len(), "casebench_starting");

    let report: ExecutionReport = executor.run(&sut_ids, &case_ids)?;

    let mut collector = ResultCollector::new();
    for result in report.results.values() {
        if let Err(errors) = collector.record(result.clone()) {
            warn!(?errors, run_id = %result.run.run_id, "result_failed_validation");
        }
    }

    let aggregates = Aggregator::aggregate(collector.results());
    let evaluations = ClaimEvaluator::evaluate_all(claims, &aggregates);
    let summary = ClaimEvaluator::summarize(&evaluations);

    std::fs::create_dir_all(&checkpoint_dir)?;
    let summary_path = checkpoint_dir.join("claim-summary.json");
    let summary_json = serde_json::json!({
        "summary": summary,
        "evaluations": evaluations,
    });
    std::fs::write(&summary_path, serde_json::to_vec_pretty(&summary_json)?)?;

    let aggregates_path = checkpoint_dir.join("aggregates.json");
    std::fs::write(&aggregates_path, serde_json::to_vec_pretty(&aggregates)?)?;

    info!(
        total_planned = report.total_planned,
        completed = report.results.len(),
        skipped = report.skipped.len(),
        satisfied = summary.satisfied,
        violated = summary.violated,
        inconclusive = summary.inconclusive,
        "casebench_finished"
    );

    if summary.violated > 0 {
        return Ok(EXIT_CLAIM_VIOLATED);
    }
    if !report.skipped.is_empty() || summary.inconclusive > 0 {
        return Ok(EXIT_INCONCLUSIVE_OR_INCOMPLETE);
    }
    Ok(EXIT_OK)
}
