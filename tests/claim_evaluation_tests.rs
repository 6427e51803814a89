//! Full pipeline: executor -> collector -> aggregator -> claim evaluator,
//! exercising the claim-satisfaction and missing-baseline scenarios end to
//! end rather than against hand-built aggregates.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use casebench::aggregator::Aggregator;
use casebench::claims::ClaimEvaluator;
use casebench::collector::ResultCollector;
use casebench::executor::{MemoryMonitor, MemoryThresholds, ParallelExecutor};
use casebench::model::{
    CaseDefinition, ClaimStatus, Direction, EvaluationCase, EvaluationClaim, Scope, Sut,
    SutOutcome, SutRole, SutRunError, SutSpec,
};
use casebench::registry::{CaseRegistry, SutRegistry};
use serde_json::json;
use tempfile::TempDir;

const PRIMARY_ID: &str = "primary-alg-v1.0.0";
const BASELINE_ID: &str = "baseline-alg-v1.0.0";
const CASE_ID: &str = "case-1";
const REPETITIONS: u32 = 20;

struct FixedScoreSut {
    id: &'static str,
    score: f64,
}

impl Sut for FixedScoreSut {
    fn id(&self) -> &str {
        self.id
    }
    fn run(&self, _inputs: &serde_json::Value) -> Result<SutOutcome, SutRunError> {
        let mut numeric = HashMap::new();
        numeric.insert("accuracy".to_string(), self.score);
        Ok(SutOutcome {
            numeric,
            outputs: serde_json::Value::Null,
            valid: true,
            matches_expected: None,
        })
    }
}

fn register_case(case_registry: &CaseRegistry) {
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
}

fn sample_claim() -> EvaluationClaim {
    EvaluationClaim {
        claim_id: "primary-beats-baseline".to_string(),
        description: "primary has higher accuracy than baseline".to_string(),
        sut: PRIMARY_ID.to_string(),
        baseline: BASELINE_ID.to_string(),
        metric: "accuracy".to_string(),
        direction: Direction::Greater,
        threshold: None,
        scope: Scope::Global,
        scope_constraints: HashMap::new(),
        significance_level: Some(0.05),
        min_effect_size: None,
        tags: vec![],
    }
}

#[test]
fn test_claim_satisfied_end_to_end() {
    let dir = TempDir::new().unwrap();

    let sut_registry = Arc::new(SutRegistry::new());
    sut_registry
        .register(
            SutSpec {
                id: PRIMARY_ID.to_string(),
                name: "Primary".to_string(),
                version: "1.0.0".to_string(),
                role: SutRole::Primary,
                config_defaults: Default::default(),
                tags: vec![],
            },
            Box::new(|_overlay| Box::new(FixedScoreSut { id: PRIMARY_ID, score: 0.85 }) as Box<dyn Sut>),
        )
        .unwrap();
    sut_registry
        .register(
            SutSpec {
                id: BASELINE_ID.to_string(),
                name: "Baseline".to_string(),
                version: "1.0.0".to_string(),
                role: SutRole::Baseline,
                config_defaults: Default::default(),
                tags: vec![],
            },
            Box::new(|_overlay| Box::new(FixedScoreSut { id: BASELINE_ID, score: 0.70 }) as Box<dyn Sut>),
        )
        .unwrap();

    let case_registry = Arc::new(CaseRegistry::new());
    register_case(&case_registry);

    let executor = ParallelExecutor::new(
        sut_registry,
        case_registry,
        dir.path().to_path_buf(),
        2,
        REPETITIONS,
        42,
        Duration::from_secs(5),
        8,
        MemoryMonitor::with_default_sampler(MemoryThresholds::default()),
    );

    let report = executor
        .run(&[PRIMARY_ID.to_string(), BASELINE_ID.to_string()], &[CASE_ID.to_string()])
        .unwrap();
    assert_eq!(report.results.len(), 2 * REPETITIONS as usize);

    let mut collector = ResultCollector::new();
    for result in report.results.values() {
        collector.record(result.clone()).unwrap();
    }

    let aggregates = Aggregator::aggregate(collector.results());
    let evaluation = ClaimEvaluator::evaluate_one(&sample_claim(), &aggregates);

    assert_eq!(evaluation.status, ClaimStatus::Satisfied);
    assert!((evaluation.evidence.delta - 0.15).abs() < 1e-9);
    assert!(evaluation.evidence.p_value.unwrap() < 0.05);
}

#[test]
fn test_claim_inconclusive_when_baseline_never_ran() {
    let dir = TempDir::new().unwrap();

    let sut_registry = Arc::new(SutRegistry::new());
    sut_registry
        .register(
            SutSpec {
                id: PRIMARY_ID.to_string(),
                name: "Primary".to_string(),
                version: "1.0.0".to_string(),
                role: SutRole::Primary,
                config_defaults: Default::default(),
                tags: vec![],
            },
            Box::new(|_overlay| Box::new(FixedScoreSut { id: PRIMARY_ID, score: 0.85 }) as Box<dyn Sut>),
        )
        .unwrap();

    let case_registry = Arc::new(CaseRegistry::new());
    register_case(&case_registry);

    let executor = ParallelExecutor::new(
        sut_registry,
        case_registry,
        dir.path().to_path_buf(),
        1,
        REPETITIONS,
        42,
        Duration::from_secs(5),
        8,
        MemoryMonitor::with_default_sampler(MemoryThresholds::default()),
    );

    // Only the primary SUT is registered/run; the baseline never appears.
    let report = executor.run(&[PRIMARY_ID.to_string()], &[CASE_ID.to_string()]).unwrap();

    let mut collector = ResultCollector::new();
    for result in report.results.values() {
        collector.record(result.clone()).unwrap();
    }

    let aggregates = Aggregator::aggregate(collector.results());
    let evaluation = ClaimEvaluator::evaluate_one(&sample_claim(), &aggregates);

    assert_eq!(evaluation.status, ClaimStatus::Inconclusive);
    assert!(evaluation
        .inconclusive_reason
        .as_ref()
        .unwrap()
        .contains("baseline"));

    let summary = ClaimEvaluator::summarize(&[evaluation]);
    assert_eq!(summary.inconclusive, 1);
    assert_eq!(summary.satisfaction_rate, 0.0);
}
