//! Checkpoint resume: a worker that restarts with a partially-completed
//! shard on disk must execute only the remaining runs, and the merged
//! result set must contain every planned run exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use casebench::checkpoint::{CheckpointShard, CheckpointStore};
use casebench::executor::{ExperimentConfig, MemoryMonitor, MemoryThresholds, ParallelExecutor};
use casebench::model::{
    CaseDefinition, Correctness, EvaluationCase, EvaluationResult, Metrics, Provenance,
    RunDescriptor, Sut, SutOutcome, SutRole, SutRunError, SutSpec,
};
use casebench::registry::{CaseRegistry, SutRegistry};
use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;

const SUT_ID: &str = "counting-sut-v1.0.0";
const CASE_ID: &str = "case-1";
const REPETITIONS: u32 = 10;
const SEED_BASE: u64 = 42;

struct CountingSut {
    calls: Arc<AtomicUsize>,
}

impl Sut for CountingSut {
    fn id(&self) -> &str {
        SUT_ID
    }

    fn run(&self, _inputs: &serde_json::Value) -> Result<SutOutcome, SutRunError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut numeric = HashMap::new();
        numeric.insert("score".to_string(), 1.0);
        Ok(SutOutcome {
            numeric,
            outputs: serde_json::Value::Null,
            valid: true,
            matches_expected: None,
        })
    }
}

fn build_registries(calls: Arc<AtomicUsize>) -> (Arc<SutRegistry>, Arc<CaseRegistry>) {
    let sut_registry = Arc::new(SutRegistry::new());
    sut_registry
        .register(
            SutSpec {
                id: SUT_ID.to_string(),
                name: "Counting SUT".to_string(),
                version: "1.0.0".to_string(),
                role: SutRole::Primary,
                config_defaults: Default::default(),
                tags: vec![],
            },
            Box::new(move |_overlay| Box::new(CountingSut { calls: Arc::clone(&calls) }) as Box<dyn Sut>),
        )
        .unwrap();

    let case_registry = Arc::new(CaseRegistry::new());
    case_registry
        .register(CaseDefinition {
            case: EvaluationCase {
                case_id: CASE_ID.to_string(),
                name: "demo".to_string(),
                case_class: "synthetic".to_string(),
                inputs: json!({}),
                version: "1.0.0".to_string(),
                tags: vec![],
            },
            get_input: Box::new(|| Ok(Arc::new(json!({})))),
            get_inputs: Box::new(|| json!({})),
        })
        .unwrap();

    (sut_registry, case_registry)
}

fn fake_result(run: RunDescriptor) -> EvaluationResult {
    EvaluationResult {
        run,
        sut_role: SutRole::Primary,
        case_class: "synthetic".to_string(),
        correctness: Correctness {
            expected_exists: false,
            produced_output: true,
            valid: true,
            matches_expected: None,
        },
        outputs: serde_json::Value::Null,
        metrics: Metrics::default(),
        provenance: Provenance {
            platform: "linux".to_string(),
            arch: "x86_64".to_string(),
            runtime_version: "0.1.0".to_string(),
            started_at: Utc::now(),
            ended_at: Utc::now(),
            memory_bytes: None,
        },
    }
}

#[test]
fn test_resume_skips_already_completed_runs() {
    let dir = TempDir::new().unwrap();
    let sut_ids = vec![SUT_ID.to_string()];
    let case_ids = vec![CASE_ID.to_string()];

    let config_hash = ExperimentConfig {
        sut_ids: sut_ids.clone(),
        case_ids: case_ids.clone(),
        repetitions: REPETITIONS,
        seed_base: SEED_BASE,
        timeout_ms: 300_000,
    }
    .config_hash()
    .unwrap();

    let run_ids: Vec<String> = (1..=REPETITIONS)
        .map(|rep| {
            RunDescriptor::new(SUT_ID, CASE_ID, rep, SEED_BASE, config_hash.clone())
                .unwrap()
                .run_id
        })
        .collect();

    // Seed a single-worker shard (workers = 1, so every run lands on worker 0)
    // with the first four runs already completed.
    let mut shard = CheckpointShard::new(config_hash.clone(), 0, 1, REPETITIONS as u64);
    for rep in 1..=4u32 {
        let run = RunDescriptor::new(SUT_ID, CASE_ID, rep, SEED_BASE, config_hash.clone()).unwrap();
        shard.record(fake_result(run));
    }
    CheckpointStore::new(dir.path(), 0).save(&shard).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let (sut_registry, case_registry) = build_registries(Arc::clone(&calls));

    let executor = ParallelExecutor::new(
        sut_registry,
        case_registry,
        dir.path().to_path_buf(),
        1,
        REPETITIONS,
        SEED_BASE,
        std::time::Duration::from_secs(5),
        8,
        MemoryMonitor::with_default_sampler(MemoryThresholds::default()),
    );

    let report = executor.run(&sut_ids, &case_ids).unwrap();

    assert_eq!(report.total_planned, u64::from(REPETITIONS));
    assert_eq!(report.results.len(), REPETITIONS as usize);
    assert!(report.skipped.is_empty());
    // Only the six runs that weren't pre-completed should have invoked the SUT.
    assert_eq!(calls.load(Ordering::SeqCst), 6);

    for run_id in &run_ids {
        assert!(report.results.contains_key(run_id), "missing {run_id}");
    }
}

#[test]
fn test_rerun_with_all_planned_complete_executes_nothing_new() {
    let dir = TempDir::new().unwrap();
    let sut_ids = vec![SUT_ID.to_string()];
    let case_ids = vec![CASE_ID.to_string()];

    let config_hash = ExperimentConfig {
        sut_ids: sut_ids.clone(),
        case_ids: case_ids.clone(),
        repetitions: REPETITIONS,
        seed_base: SEED_BASE,
        timeout_ms: 300_000,
    }
    .config_hash()
    .unwrap();

    let mut shard = CheckpointShard::new(config_hash.clone(), 0, 1, REPETITIONS as u64);
    for rep in 1..=REPETITIONS {
        let run = RunDescriptor::new(SUT_ID, CASE_ID, rep, SEED_BASE, config_hash.clone()).unwrap();
        shard.record(fake_result(run));
    }
    CheckpointStore::new(dir.path(), 0).save(&shard).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let (sut_registry, case_registry) = build_registries(Arc::clone(&calls));

    let executor = ParallelExecutor::new(
        sut_registry,
        case_registry,
        dir.path().to_path_buf(),
        1,
        REPETITIONS,
        SEED_BASE,
        std::time::Duration::from_secs(5),
        8,
        MemoryMonitor::with_default_sampler(MemoryThresholds::default()),
    );

    let report = executor.run(&sut_ids, &case_ids).unwrap();

    assert_eq!(report.results.len(), REPETITIONS as usize);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
