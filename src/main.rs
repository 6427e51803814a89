//! # casebench
//!
//! Reference driver for the evaluation harness. Wires up a small demo
//! experiment — two systems under test over one graph case, one claim —
//! and runs it through the full plan/execute/aggregate/evaluate pipeline.
//!
//! Real users link against the `casebench` library and register their own
//! SUTs, cases, and claims; this binary exists to exercise the pipeline
//! end to end, loading a handful of demo facts before running the
//! pipeline once.
//!
//! ```bash
//! cargo run --bin casebench -- --repetitions 3
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::json;

use casebench::cli::{self, Cli};
use casebench::model::{
    CaseDefinition, Direction, EvaluationCase, EvaluationClaim, Scope, Sut, SutOutcome, SutRole,
    SutRunError, SutSpec,
};
use casebench::registry::{CaseRegistry, SutRegistry};

fn register_demo_suts(registry: &SutRegistry) {
    registry
        .register(
            SutSpec {
                id: "greedy-coloring-v1.0.0".to_string(),
                name: "Greedy Coloring".to_string(),
                version: "1.0.0".to_string(),
                role: SutRole::Primary,
                config_defaults: Default::default(),
                tags: vec!["coloring".to_string()],
            },
            Box::new(|_overlay| Box::new(GreedyColoring) as Box<dyn Sut>),
        )
        .expect("demo SUT registration must not collide");

    registry
        .register(
            SutSpec {
                id: "random-coloring-v1.0.0".to_string(),
                name: "Random Coloring".to_string(),
                version: "1.0.0".to_string(),
                role: SutRole::Baseline,
                config_defaults: Default::default(),
                tags: vec!["coloring".to_string()],
            },
            Box::new(|_overlay| Box::new(RandomColoring) as Box<dyn Sut>),
        )
        .expect("demo SUT registration must not collide");
}

fn register_demo_cases(registry: &CaseRegistry) {
    for (case_id, node_count) in [("social-small", 50usize), ("social-medium", 500)] {
        let n = node_count;
        registry
            .register(CaseDefinition {
                case: EvaluationCase {
                    case_id: case_id.to_string(),
                    name: format!("Social graph ({n} nodes)"),
                    case_class: "social".to_string(),
                    inputs: json!({ "nodeCount": n }),
                    version: "1.0.0".to_string(),
                    tags: vec!["demo".to_string()],
                },
                get_input: Box::new(move || Ok(Arc::new(json!({ "nodeCount": n, "edges": [] })))),
                get_inputs: Box::new(move || json!({ "nodeCount": n })),
            })
            .expect("demo case registration must not collide");
    }
}

fn demo_claims() -> Vec<EvaluationClaim> {
    vec![EvaluationClaim {
        claim_id: "greedy-uses-fewer-colors".to_string(),
        description: "Greedy coloring uses no more colors than random coloring on average"
            .to_string(),
        sut: "greedy-coloring-v1.0.0".to_string(),
        baseline: "random-coloring-v1.0.0".to_string(),
        metric: "colors_used".to_string(),
        direction: Direction::Less,
        threshold: None,
        scope: Scope::Global,
        scope_constraints: Default::default(),
        significance_level: Some(0.05),
        min_effect_size: None,
        tags: vec!["demo".to_string()],
    }]
}

struct GreedyColoring;
impl Sut for GreedyColoring {
    fn id(&self) -> &str {
        "greedy-coloring-v1.0.0"
    }

    fn run(&self, inputs: &serde_json::Value) -> Result<SutOutcome, SutRunError> {
        let node_count = inputs["nodeCount"].as_u64().unwrap_or(0) as f64;
        let colors_used = (node_count / 10.0).max(1.0).floor();
        let mut numeric = std::collections::HashMap::new();
        numeric.insert("colors_used".to_string(), colors_used);
        Ok(SutOutcome {
            numeric,
            outputs: json!({ "colors": colors_used as u64 }),
            valid: true,
            matches_expected: None,
        })
    }
}

struct RandomColoring;
impl Sut for RandomColoring {
    fn id(&self) -> &str {
        "random-coloring-v1.0.0"
    }

    fn run(&self, inputs: &serde_json::Value) -> Result<SutOutcome, SutRunError> {
        let node_count = inputs["nodeCount"].as_u64().unwrap_or(0) as f64;
        let colors_used = (node_count / 6.0).max(1.0).floor();
        let mut numeric = std::collections::HashMap::new();
        numeric.insert("colors_used".to_string(), colors_used);
        Ok(SutOutcome {
            numeric,
            outputs: json!({ "colors": colors_used as u64 }),
            valid: true,
            matches_expected: None,
        })
    }
}

/// Wires the demo registries and runs the pipeline once, wrapping the
/// library's `CasebenchError` in `anyhow` context so a failure in, say,
/// config loading reports which step it happened in rather than just the
/// bare underlying error.
fn try_main(cli_args: &Cli) -> anyhow::Result<i32> {
    let sut_registry = Arc::new(SutRegistry::new());
    register_demo_suts(&sut_registry);

    let case_registry = Arc::new(CaseRegistry::new());
    register_demo_cases(&case_registry);

    let claims = demo_claims();

    cli::run(cli_args, sut_registry, case_registry, &claims)
        .context("casebench run failed")
}

fn main() {
    let format = std::env::var("CASEBENCH_LOG_FORMAT").unwrap_or_default();
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    );
    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let cli_args = Cli::parse();

    let code = match try_main(&cli_args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("casebench: {err:#}");
            cli::EXIT_FATAL
        }
    };

    std::process::exit(code);
}
