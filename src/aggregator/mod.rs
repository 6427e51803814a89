//! Groups validated results by `(sut, caseClass)` and computes summary
//! statistics plus pairwise comparisons against baselines.

mod comparison;
mod summary;

pub use comparison::{cohens_d_magnitude, nonparametric_magnitude, p_value, EffectMagnitude};

use std::collections::HashMap;

use crate::model::{AggregatedResult, EvaluationResult, GroupInfo, PairwiseComparison, SutRole};

/// Group results by `(sutId, caseClass)`, compute one `AggregatedResult`
/// per partition, then attach pairwise comparisons (primary vs. every
/// baseline sharing a case-class) to the primary's aggregate.
pub struct Aggregator;

impl Aggregator {
    pub fn aggregate(results: &[EvaluationResult]) -> Vec<AggregatedResult> {
        let mut by_sut_class: HashMap<(String, String), Vec<&EvaluationResult>> = HashMap::new();
        let mut role_by_sut: HashMap<String, SutRole> = HashMap::new();

        for result in results {
            by_sut_class
                .entry((result.run.sut_id.clone(), result.case_class.clone()))
                .or_default()
                .push(result);
            role_by_sut.insert(result.run.sut_id.clone(), result.sut_role);
        }

        let mut aggregates: Vec<AggregatedResult> = by_sut_class
            .iter()
            .map(|((sut, case_class), partition)| {
                let metric_names = unique_metric_names(partition);
                let metrics = metric_names
                    .into_iter()
                    .map(|metric| {
                        let values: Vec<f64> = partition
                            .iter()
                            .filter_map(|r| r.metrics.numeric.get(&metric).copied())
                            .collect();
                        (metric, summary::summarize(&values))
                    })
                    .collect();

                AggregatedResult {
                    sut: sut.clone(),
                    case_class: case_class.clone(),
                    group: GroupInfo {
                        case_count: partition.len(),
                    },
                    metrics,
                    comparisons: HashMap::new(),
                }
            })
            .collect();

        let results_by_sut_class: HashMap<(String, String), Vec<&EvaluationResult>> = by_sut_class;

        for aggregate in &mut aggregates {
            if role_by_sut.get(&aggregate.sut) != Some(&SutRole::Primary) {
                continue;
            }
            let primary_results = &results_by_sut_class[&(aggregate.sut.clone(), aggregate.case_class.clone())];

            for ((other_sut, other_class), other_results) in &results_by_sut_class {
                if other_class != &aggregate.case_class {
                    continue;
                }
                if role_by_sut.get(other_sut) != Some(&SutRole::Baseline) {
                    continue;
                }

                let mut per_metric = HashMap::new();
                for metric in unique_metric_names(primary_results) {
                    let primary_values: Vec<f64> = primary_results
                        .iter()
                        .filter_map(|r| r.metrics.numeric.get(&metric).copied())
                        .collect();
                    let baseline_values: Vec<f64> = other_results
                        .iter()
                        .filter_map(|r| r.metrics.numeric.get(&metric).copied())
                        .collect();

                    if primary_values.is_empty() || baseline_values.is_empty() {
                        continue;
                    }

                    let effect_size = comparison::cohens_d(&primary_values, &baseline_values)
                        .or_else(|| Some(comparison::cliffs_delta(&primary_values, &baseline_values)));
                    let (u_statistic, p) = comparison::mann_whitney_u(&primary_values, &baseline_values)
                        .map_or((None, None), |(u, p)| (Some(u), Some(p)));
                    let pval = comparison::p_value(&primary_values, &baseline_values).or(p);

                    per_metric.insert(
                        metric,
                        PairwiseComparison {
                            p_value: pval,
                            effect_size,
                            u_statistic,
                        },
                    );
                }

                aggregate.comparisons.insert(other_sut.clone(), per_metric);
            }
        }

        aggregates
    }
}

fn unique_metric_names(partition: &[&EvaluationResult]) -> Vec<String> {
    let mut names: Vec<String> = partition
        .iter()
        .flat_map(|r| r.metrics.numeric.keys().cloned())
        .collect();
    names.sort();
    names.dedup();
    names
}
