//! Buffers, validates, queries, and (de)serializes evaluation results.
//!
//! `validate` walks every required path and returns the complete list of
//! failures rather than bailing at the first, since a result with three
//! missing fields should report all three at once.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing;
use crate::model::{EvaluationResult, SutRole};

/// One failed required-field check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Serialized snapshot of a collector's contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultBatch {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<EvaluationResult>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

const BATCH_VERSION: &str = "1.0.0";

/// Optional filters for `ResultCollector::query`. All `None` fields match
/// everything.
#[derive(Default)]
pub struct ResultQuery {
    pub sut: Option<String>,
    pub sut_role: Option<SutRole>,
    pub case_id: Option<String>,
    pub case_class: Option<String>,
    pub valid: Option<bool>,
    pub has_metric: Option<String>,
    pub predicate: Option<Box<dyn Fn(&EvaluationResult) -> bool>>,
}

impl ResultQuery {
    fn matches(&self, result: &EvaluationResult) -> bool {
        if let Some(sut) = &self.sut {
            if &result.run.sut_id != sut {
                return false;
            }
        }
        if let Some(role) = self.sut_role {
            if result.sut_role != role {
                return false;
            }
        }
        if let Some(case_id) = &self.case_id {
            if &result.run.case_id != case_id {
                return false;
            }
        }
        if let Some(case_class) = &self.case_class {
            if &result.case_class != case_class {
                return false;
            }
        }
        if let Some(valid) = self.valid {
            if result.correctness.valid != valid {
                return false;
            }
        }
        if let Some(metric) = &self.has_metric {
            if !result.metrics.numeric.contains_key(metric) {
                return false;
            }
        }
        if let Some(predicate) = &self.predicate {
            if !predicate(result) {
                return false;
            }
        }
        true
    }
}

fn validate(result: &EvaluationResult) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if result.run.run_id.is_empty() {
        errors.push(ValidationError {
            field: "run.runId".to_string(),
            message: "must not be empty".to_string(),
        });
    } else if !hashing::parse_run_id(&result.run.run_id).valid {
        errors.push(ValidationError {
            field: "run.runId".to_string(),
            message: format!("'{}' is not a well-formed 16-hex run id", result.run.run_id),
        });
    }

    if result.run.sut_id.is_empty() {
        errors.push(ValidationError {
            field: "run.sut".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if result.run.case_id.is_empty() {
        errors.push(ValidationError {
            field: "run.caseId".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if !result.metrics_are_well_formed() {
        errors.push(ValidationError {
            field: "metrics.numeric".to_string(),
            message: "must not contain NaN for recorded values".to_string(),
        });
    }

    errors
}

/// Buffers validated results for one experiment; the in-memory counterpart
/// to a `ResultBatch` on disk.
#[derive(Default)]
pub struct ResultCollector {
    results: Vec<EvaluationResult>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `result` and, if it passes, append it. Returns every
    /// violated invariant on failure without mutating the collector.
    pub fn record(&mut self, result: EvaluationResult) -> Result<(), Vec<ValidationError>> {
        let errors = validate(&result);
        if !errors.is_empty() {
            return Err(errors);
        }
        self.results.push(result);
        Ok(())
    }

    /// Record many results in order; stops at the first invalid one.
    /// Entries already recorded before the failure stay in the collector.
    pub fn record_batch(
        &mut self,
        results: Vec<EvaluationResult>,
    ) -> Result<(), Vec<ValidationError>> {
        for result in results {
            self.record(result)?;
        }
        Ok(())
    }

    pub fn query(&self, filter: &ResultQuery) -> Vec<&EvaluationResult> {
        self.results.iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn get_unique_suts(&self) -> Vec<String> {
        let mut suts: Vec<String> = self.results.iter().map(|r| r.run.sut_id.clone()).collect();
        suts.sort();
        suts.dedup();
        suts
    }

    pub fn get_unique_case_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.results.iter().map(|r| r.case_class.clone()).collect();
        classes.sort();
        classes.dedup();
        classes
    }

    pub fn get_unique_metrics(&self) -> Vec<String> {
        let mut metrics: Vec<String> = self
            .results
            .iter()
            .flat_map(|r| r.metrics.numeric.keys().cloned())
            .collect();
        metrics.sort();
        metrics.dedup();
        metrics
    }

    /// Every recorded value of `metric` for `sut`, in recording order.
    pub fn get_metric_values(&self, sut: &str, metric: &str) -> Vec<f64> {
        self.results
            .iter()
            .filter(|r| r.run.sut_id == sut)
            .filter_map(|r| r.metrics.numeric.get(metric).copied())
            .collect()
    }

    /// Every recorded value of `metric`, grouped by `sutId`.
    pub fn extract_metric(&self, metric: &str) -> HashMap<String, Vec<f64>> {
        let mut out: HashMap<String, Vec<f64>> = HashMap::new();
        for result in &self.results {
            if let Some(value) = result.metrics.numeric.get(metric) {
                out.entry(result.run.sut_id.clone()).or_default().push(*value);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn serialize(&self, metadata: Option<serde_json::Value>) -> ResultBatch {
        ResultBatch {
            version: BATCH_VERSION.to_string(),
            timestamp: Utc::now(),
            results: self.results.clone(),
            metadata,
        }
    }

    /// Load a batch into this collector. If `append` is false, existing
    /// results are cleared first. Stops at the first invalid result in the
    /// batch, per `record_batch`.
    pub fn load(&mut self, batch: ResultBatch, append: bool) -> Result<(), Vec<ValidationError>> {
        if !append {
            self.results.clear();
        }
        self.record_batch(batch.results)
    }
}
