//! Run descriptors and evaluation results.

use serde::{Deserialize, Serialize};

use super::sut::SutRole;
use crate::hashing;

/// One planned (SUT, case, repetition) triple, with its derived identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RunDescriptor {
    pub run_id: String,
    pub sut_id: String,
    pub case_id: String,
    pub repetition: u32,
    pub seed: u64,
    pub config_hash: String,
}

/// The fields that feed `generate_run_id` — kept as a separate serializable
/// struct so the hash input is exactly the identifying fields and nothing
/// more (not `sutRole`/`caseClass`, which are descriptive, not identifying).
#[derive(Serialize)]
struct RunIdInputs<'a> {
    sut_id: &'a str,
    case_id: &'a str,
    repetition: u32,
    seed: u64,
    config_hash: &'a str,
}

impl RunDescriptor {
    /// Build a descriptor, deriving `run_id` from the other fields.
    pub fn new(
        sut_id: impl Into<String>,
        case_id: impl Into<String>,
        repetition: u32,
        seed_base: u64,
        config_hash: impl Into<String>,
    ) -> serde_json::Result<Self> {
        let sut_id = sut_id.into();
        let case_id = case_id.into();
        let config_hash = config_hash.into();
        let seed = seed_base ^ u64::from(repetition);

        let run_id = hashing::generate_run_id(&RunIdInputs {
            sut_id: &sut_id,
            case_id: &case_id,
            repetition,
            seed,
            config_hash: &config_hash,
        })?;

        Ok(RunDescriptor {
            run_id,
            sut_id,
            case_id,
            repetition,
            seed,
            config_hash,
        })
    }
}

/// Correctness verdict attached to one run's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correctness {
    pub expected_exists: bool,
    pub produced_output: bool,
    pub valid: bool,
    pub matches_expected: Option<bool>,
}

/// Runtime provenance recorded for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub platform: String,
    pub arch: String,
    pub runtime_version: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: chrono::DateTime<chrono::Utc>,
    pub memory_bytes: Option<u64>,
}

/// Flat numeric metrics map, the only part of a SUT's output the core
/// interprets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metrics {
    pub numeric: std::collections::HashMap<String, f64>,
}

/// The outcome of one completed (or failed/timed-out) run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub run: RunDescriptor,
    pub sut_role: SutRole,
    pub case_class: String,
    pub correctness: Correctness,
    pub outputs: serde_json::Value,
    pub metrics: Metrics,
    pub provenance: Provenance,
}

impl EvaluationResult {
    /// True if every recorded numeric metric value is finite (no NaN).
    pub fn metrics_are_well_formed(&self) -> bool {
        self.metrics.numeric.values().all(|v| !v.is_nan())
    }
}
