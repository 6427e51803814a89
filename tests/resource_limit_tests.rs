//! Per-run timeout enforcement and the memory monitor's threshold bands.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use casebench::aggregator::Aggregator;
use casebench::executor::{MemoryLevel, MemoryMonitor, MemorySample, MemoryThresholds, ParallelExecutor};
use casebench::model::{CaseDefinition, EvaluationCase, Sut, SutOutcome, SutRole, SutRunError, SutSpec};
use casebench::registry::{CaseRegistry, SutRegistry};
use serde_json::json;
use tempfile::TempDir;

const SLOW_SUT_ID: &str = "slow-sut-v1.0.0";
const CASE_ID: &str = "case-1";

struct SlowSut;
impl Sut for SlowSut {
    fn id(&self) -> &str {
        SLOW_SUT_ID
    }
    fn run(&self, _inputs: &serde_json::Value) -> Result<SutOutcome, SutRunError> {
        std::thread::sleep(Duration::from_secs(2));
        let mut numeric = HashMap::new();
        numeric.insert("latency_ms".to_string(), 1.0);
        Ok(SutOutcome {
            numeric,
            outputs: serde_json::Value::Null,
            valid: true,
            matches_expected: None,
        })
    }
}

#[test]
fn test_run_exceeding_timeout_is_recorded_as_failed_but_completed() {
    let dir = TempDir::new().unwrap();

    let sut_registry = Arc::new(SutRegistry::new());
    sut_registry
        .register(
            SutSpec {
                id: SLOW_SUT_ID.to_string(),
                name: "Slow SUT".to_string(),
                version: "1.0.0".to_string(),
                role: SutRole::Primary,
                config_defaults: Default::default(),
                tags: vec![],
            },
            Box::new(|_overlay| Box::new(SlowSut) as Box<dyn Sut>),
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

    let executor = ParallelExecutor::new(
        sut_registry,
        case_registry,
        dir.path().to_path_buf(),
        1,
        1,
        42,
        Duration::from_millis(100),
        8,
        MemoryMonitor::with_default_sampler(MemoryThresholds::default()),
    );

    let report = executor
        .run(&[SLOW_SUT_ID.to_string()], &[CASE_ID.to_string()])
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert!(report.skipped.is_empty());

    let result = report.results.values().next().unwrap();
    assert!(!result.correctness.produced_output);
    assert!(!result.correctness.valid);
    assert!(!result.metrics.numeric.contains_key("latency_ms"));

    let aggregates = Aggregator::aggregate(&report.results.values().cloned().collect::<Vec<_>>());
    let aggregate = aggregates
        .iter()
        .find(|a| a.sut == SLOW_SUT_ID)
        .expect("aggregate for timed-out SUT should still exist");
    assert!(
        !aggregate.metrics.contains_key("latency_ms"),
        "a metric never recorded should be absent, not a zero-filled entry"
    );
}

#[test]
fn test_memory_monitor_classifies_samples_against_configured_thresholds() {
    let thresholds = MemoryThresholds {
        warning_bytes: 1_000,
        critical_bytes: 2_000,
        emergency_bytes: 3_000,
    };
    let monitor = MemoryMonitor::new(
        Arc::new(|| MemorySample { rss_bytes: 1_500, heap_bytes: 0 }),
        thresholds,
    );
    assert_eq!(monitor.check(), MemoryLevel::Warning);
}
