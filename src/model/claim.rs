//! Declared hypotheses about how one SUT compares to another.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Direction of the expected effect on the named metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Greater,
    Less,
    Equal,
}

/// Scope over which a claim is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Scope {
    Global,
    CaseClass,
    ParameterRange,
}

/// Final verdict for one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Satisfied,
    Violated,
    Inconclusive,
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Satisfied => write!(f, "satisfied"),
            ClaimStatus::Violated => write!(f, "violated"),
            ClaimStatus::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// A declared hypothesis: primary SUT vs. baseline SUT on a named metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationClaim {
    pub claim_id: String,
    pub description: String,
    pub sut: String,
    pub baseline: String,
    pub metric: String,
    pub direction: Direction,
    pub threshold: Option<f64>,
    pub scope: Scope,
    #[serde(default)]
    pub scope_constraints: HashMap<String, Vec<String>>,
    #[serde(default = "default_significance_level")]
    pub significance_level: Option<f64>,
    pub min_effect_size: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_significance_level() -> Option<f64> {
    Some(0.05)
}

/// Evidence recorded for one claim evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEvidence {
    pub primary_value: f64,
    pub baseline_value: f64,
    pub delta: f64,
    pub ratio: f64,
    pub p_value: Option<f64>,
    pub effect_size: Option<f64>,
    pub n: Option<usize>,
}

/// The verdict for one claim, plus the evidence that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEvaluation {
    pub claim: EvaluationClaim,
    pub status: ClaimStatus,
    pub evidence: ClaimEvidence,
    pub inconclusive_reason: Option<String>,
}

/// Aggregate summary over many claim evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub total: usize,
    pub satisfied: usize,
    pub violated: usize,
    pub inconclusive: usize,
    pub satisfaction_rate: f64,
}

impl ClaimSummary {
    pub fn from_evaluations(evaluations: &[ClaimEvaluation]) -> Self {
        let total = evaluations.len();
        let satisfied = evaluations
            .iter()
            .filter(|e| e.status == ClaimStatus::Satisfied)
            .count();
        let violated = evaluations
            .iter()
            .filter(|e| e.status == ClaimStatus::Violated)
            .count();
        let inconclusive = evaluations
            .iter()
            .filter(|e| e.status == ClaimStatus::Inconclusive)
            .count();
        let definitive = satisfied + violated;
        let satisfaction_rate = if definitive == 0 {
            0.0
        } else {
            satisfied as f64 / definitive as f64
        };

        ClaimSummary {
            total,
            satisfied,
            violated,
            inconclusive,
            satisfaction_rate,
        }
    }
}
