//! Deterministic run planning.

use serde::Serialize;

use super::error::ExecutorResult;
use crate::hashing;
use crate::model::RunDescriptor;

/// The fields that determine an experiment's `configHash`: SUT and case
/// identity/version, the repetition count, seed base, and timeout — the
/// exact list the config-hash guard checks at worker start.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentConfig {
    pub sut_ids: Vec<String>,
    pub case_ids: Vec<String>,
    pub repetitions: u32,
    pub seed_base: u64,
    pub timeout_ms: u64,
}

impl ExperimentConfig {
    pub fn config_hash(&self) -> serde_json::Result<String> {
        hashing::generate_config_hash(self)
    }
}

/// Emit `sut_ids.len() * case_ids.len() * repetitions` run descriptors in
/// deterministic `(sutId, caseId, repetition)` order.
pub fn plan(
    sut_ids: &[String],
    case_ids: &[String],
    repetitions: u32,
    seed_base: u64,
    config_hash: &str,
) -> ExecutorResult<Vec<RunDescriptor>> {
    let mut suts: Vec<&String> = sut_ids.iter().collect();
    suts.sort();
    let mut cases: Vec<&String> = case_ids.iter().collect();
    cases.sort();

    let mut plan = Vec::with_capacity(suts.len() * cases.len() * repetitions.max(1) as usize);
    for sut_id in &suts {
        for case_id in &cases {
            for repetition in 1..=repetitions {
                plan.push(RunDescriptor::new(
                    (*sut_id).clone(),
                    (*case_id).clone(),
                    repetition,
                    seed_base,
                    config_hash,
                )?);
            }
        }
    }
    Ok(plan)
}
