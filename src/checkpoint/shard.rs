//! Checkpoint shard: one worker's durable slice of completed-run state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::EvaluationResult;

/// Per-worker durable record of completed runs, persisted as a single JSON
/// document at `<dir>/checkpoint-worker-NN.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointShard {
    pub config_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_run_ids: Vec<String>,
    pub results: HashMap<String, EvaluationResult>,
    pub total_planned: u64,
    pub worker_index: u32,
    pub total_workers: u32,
}

impl CheckpointShard {
    pub fn new(config_hash: impl Into<String>, worker_index: u32, total_workers: u32, total_planned: u64) -> Self {
        let now = Utc::now();
        CheckpointShard {
            config_hash: config_hash.into(),
            created_at: now,
            updated_at: now,
            completed_run_ids: Vec::new(),
            results: HashMap::new(),
            total_planned,
            worker_index,
            total_workers,
        }
    }

    /// Record one completed run: appends to `completed_run_ids` and inserts
    /// into `results`, maintaining the invariant that every completed id has
    /// a corresponding result.
    pub fn record(&mut self, result: EvaluationResult) {
        let run_id = result.run.run_id.clone();
        if !self.results.contains_key(&run_id) {
            self.completed_run_ids.push(run_id.clone());
        }
        self.results.insert(run_id, result);
        self.updated_at = Utc::now();
    }

    pub fn is_completed(&self, run_id: &str) -> bool {
        self.results.contains_key(run_id)
    }

    /// Validate the two shard invariants: every completed run id has a
    /// result, and `worker_index` is in range.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_index >= self.total_workers {
            return Err(format!(
                "workerIndex {} out of range for totalWorkers {}",
                self.worker_index, self.total_workers
            ));
        }
        for run_id in &self.completed_run_ids {
            if !self.results.contains_key(run_id) {
                return Err(format!(
                    "completedRunIds contains '{run_id}' with no matching results entry"
                ));
            }
        }
        Ok(())
    }
}
