//! Evaluates declared claims against computed aggregates, issuing a
//! satisfied/violated/inconclusive verdict via a five-step procedure:
//! scope-filter the aggregates, locate primary and baseline, check for
//! missing data, compute delta/ratio/significance, then decide status.

use crate::model::{
    AggregatedResult, ClaimEvaluation, ClaimEvidence, ClaimStatus, ClaimSummary, Direction,
    EvaluationClaim, Scope,
};

/// Sentinel value for claim evidence when a required aggregate is absent.
/// Read back only through `is_nan()`, never compared with `==`.
const SENTINEL_NAN: f64 = f64::NAN;

const DEFAULT_EQUAL_THRESHOLD: f64 = 0.001;

pub struct ClaimEvaluator;

impl ClaimEvaluator {
    /// Evaluate every claim against `aggregates`, returning one
    /// `ClaimEvaluation` per claim in the same order.
    pub fn evaluate_all(
        claims: &[EvaluationClaim],
        aggregates: &[AggregatedResult],
    ) -> Vec<ClaimEvaluation> {
        claims
            .iter()
            .map(|claim| Self::evaluate_one(claim, aggregates))
            .collect()
    }

    pub fn evaluate_one(claim: &EvaluationClaim, aggregates: &[AggregatedResult]) -> ClaimEvaluation {
        let scoped = filter_by_scope(claim, aggregates);

        let primary = scoped.iter().find(|a| a.sut == claim.sut);
        let baseline = scoped.iter().find(|a| a.sut == claim.baseline);

        let (Some(primary), Some(baseline)) = (primary, baseline) else {
            let missing = match (primary, baseline) {
                (None, None) => "primary and baseline",
                (None, Some(_)) => "primary",
                (Some(_), None) => "baseline",
                (Some(_), Some(_)) => unreachable!(),
            };
            return inconclusive(
                claim.clone(),
                format!("no aggregate found for {missing} SUT within the claim's scope"),
            );
        };

        let primary_value = primary
            .metrics
            .get(&claim.metric)
            .map_or(SENTINEL_NAN, |s| s.mean);
        let baseline_value = baseline
            .metrics
            .get(&claim.metric)
            .map_or(SENTINEL_NAN, |s| s.mean);

        if primary_value.is_nan() || baseline_value.is_nan() {
            return inconclusive_with_evidence(
                claim.clone(),
                format!("metric '{}' missing from primary or baseline aggregate", claim.metric),
                primary_value,
                baseline_value,
            );
        }

        let delta = primary_value - baseline_value;
        let ratio = if baseline_value == 0.0 {
            f64::INFINITY
        } else {
            primary_value / baseline_value
        };

        let comparison = primary.comparisons.get(&claim.baseline).and_then(|m| m.get(&claim.metric));
        let p_value = comparison.and_then(|c| c.p_value);
        let effect_size = comparison.and_then(|c| c.effect_size);
        let n = Some(primary.group.case_count);

        let evidence = ClaimEvidence {
            primary_value,
            baseline_value,
            delta,
            ratio,
            p_value,
            effect_size,
            n,
        };

        if let Some(level) = claim.significance_level {
            if let Some(p) = p_value {
                if p > level {
                    return ClaimEvaluation {
                        claim: claim.clone(),
                        status: ClaimStatus::Inconclusive,
                        evidence,
                        inconclusive_reason: Some(format!(
                            "p-value {p:.4} exceeds significance level {level:.4}"
                        )),
                    };
                }
            }
        }

        if let Some(min_effect) = claim.min_effect_size {
            if let Some(effect) = effect_size {
                if effect.abs() < min_effect {
                    return ClaimEvaluation {
                        claim: claim.clone(),
                        status: ClaimStatus::Inconclusive,
                        evidence,
                        inconclusive_reason: Some(format!(
                            "effect size {effect:.4} below minimum {min_effect:.4}"
                        )),
                    };
                }
            }
        }

        let satisfied = match claim.direction {
            Direction::Greater => {
                let threshold = claim.threshold.unwrap_or(0.0);
                if claim.threshold.is_some() {
                    delta >= threshold
                } else {
                    delta > 0.0
                }
            }
            Direction::Less => {
                let threshold = claim.threshold.unwrap_or(0.0);
                if claim.threshold.is_some() {
                    delta <= -threshold
                } else {
                    delta < 0.0
                }
            }
            Direction::Equal => {
                let threshold = claim.threshold.unwrap_or(DEFAULT_EQUAL_THRESHOLD);
                delta.abs() <= threshold
            }
        };

        ClaimEvaluation {
            claim: claim.clone(),
            status: if satisfied {
                ClaimStatus::Satisfied
            } else {
                ClaimStatus::Violated
            },
            evidence,
            inconclusive_reason: None,
        }
    }

    pub fn summarize(evaluations: &[ClaimEvaluation]) -> ClaimSummary {
        ClaimSummary::from_evaluations(evaluations)
    }
}

fn filter_by_scope<'a>(
    claim: &EvaluationClaim,
    aggregates: &'a [AggregatedResult],
) -> Vec<&'a AggregatedResult> {
    match &claim.scope {
        Scope::Global => aggregates.iter().collect(),
        Scope::CaseClass | Scope::ParameterRange => {
            let allowed = claim.scope_constraints.get("caseClass");
            aggregates
                .iter()
                .filter(|a| match allowed {
                    Some(values) => values.iter().any(|v| v == &a.case_class),
                    None => true,
                })
                .collect()
        }
    }
}

fn inconclusive(claim: EvaluationClaim, reason: String) -> ClaimEvaluation {
    inconclusive_with_evidence(claim, reason, SENTINEL_NAN, SENTINEL_NAN)
}

fn inconclusive_with_evidence(
    claim: EvaluationClaim,
    reason: String,
    primary_value: f64,
    baseline_value: f64,
) -> ClaimEvaluation {
    ClaimEvaluation {
        claim,
        status: ClaimStatus::Inconclusive,
        evidence: ClaimEvidence {
            primary_value,
            baseline_value,
            delta: SENTINEL_NAN,
            ratio: SENTINEL_NAN,
            p_value: None,
            effect_size: None,
            n: None,
        },
        inconclusive_reason: Some(reason),
    }
}
