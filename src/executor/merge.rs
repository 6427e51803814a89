//! Merge phase: union every worker's shard into one result set.
//!
//! A directory-scan-then-load shape that enforces the cross-shard
//! invariants: identical `configHash`, and no `runId` appearing in more
//! than one shard.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::error::{ExecutorError, ExecutorResult};
use crate::checkpoint::{CheckpointError, CheckpointStore};
use crate::model::{EvaluationResult, RunDescriptor};

/// Outcome of merging every worker's shard for one experiment.
pub struct MergeReport {
    pub results: HashMap<String, EvaluationResult>,
    /// Planned run ids with no result in any shard.
    pub skipped: Vec<String>,
}

fn load_shard_file(path: &Path) -> ExecutorResult<crate::checkpoint::CheckpointShard> {
    let content = fs::read_to_string(path)?;
    let shard: crate::checkpoint::CheckpointShard =
        serde_json::from_str(&content).map_err(|e| CheckpointError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    shard
        .validate()
        .map_err(|reason| CheckpointError::Corrupt {
            path: path.display().to_string(),
            reason,
        })?;
    Ok(shard)
}

/// Read every shard in `dir`, verify they agree on `configHash`, union their
/// results, and report any `planned` run id with no matching result.
pub fn merge(
    dir: &Path,
    expected_config_hash: &str,
    planned: &[RunDescriptor],
) -> ExecutorResult<MergeReport> {
    let paths = CheckpointStore::find_shards(dir)?;

    let mut results: HashMap<String, EvaluationResult> = HashMap::new();
    for path in &paths {
        let shard = load_shard_file(path)?;
        if shard.config_hash != expected_config_hash {
            return Err(ExecutorError::ConfigMismatch {
                expected: expected_config_hash.to_string(),
                found: shard.config_hash,
                path: path.display().to_string(),
            });
        }
        for (run_id, result) in shard.results {
            if results.contains_key(&run_id) {
                return Err(ExecutorError::DuplicateRun(run_id));
            }
            results.insert(run_id, result);
        }
    }

    let skipped = planned
        .iter()
        .filter(|run| !results.contains_key(&run.run_id))
        .map(|run| run.run_id.clone())
        .collect();

    Ok(MergeReport { results, skipped })
}
