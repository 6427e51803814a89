//! Per-worker durable checkpoint storage.
//!
//! Each shard lives at a deterministic path,
//! `<dir>/checkpoint-worker-NN.json` (two-digit zero-padded worker index).
//! Writes are atomic: serialize to a sibling `.tmp` path, then rename over
//! the target, following `hnsw_index::HnswIndex::save`'s
//! write-then-rename idiom so a crash mid-write never corrupts the previous
//! shard.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{CheckpointError, CheckpointResult};
use super::shard::CheckpointShard;

/// Durable store for a single worker's checkpoint shard.
pub struct CheckpointStore {
    dir: PathBuf,
    worker_index: u32,
}

fn shard_file_name(worker_index: u32) -> String {
    format!("checkpoint-worker-{worker_index:02}.json")
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>, worker_index: u32) -> Self {
        CheckpointStore {
            dir: dir.into(),
            worker_index,
        }
    }

    fn shard_path(&self) -> PathBuf {
        self.dir.join(shard_file_name(self.worker_index))
    }

    /// Write `shard` atomically: serialize to a `.tmp` sibling, then rename
    /// over the target. Any failure before the rename leaves the previous
    /// shard intact.
    pub fn save(&self, shard: &CheckpointShard) -> CheckpointResult<()> {
        fs::create_dir_all(&self.dir)?;

        let final_path = self.shard_path();
        let tmp_path = final_path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(shard)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &final_path)?;

        debug!(
            worker_index = self.worker_index,
            completed = shard.completed_run_ids.len(),
            "checkpoint_shard_saved"
        );
        Ok(())
    }

    /// Load this worker's shard, returning `None` if it doesn't exist.
    /// `CheckpointError::Corrupt` if the file exists but cannot be parsed
    /// or violates shard invariants.
    pub fn load(&self) -> CheckpointResult<Option<CheckpointShard>> {
        let path = self.shard_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let shard: CheckpointShard = serde_json::from_str(&content).map_err(|e| {
            CheckpointError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        shard
            .validate()
            .map_err(|reason| CheckpointError::Corrupt {
                path: path.display().to_string(),
                reason,
            })?;

        Ok(Some(shard))
    }

    pub fn exists(&self) -> bool {
        self.shard_path().exists()
    }

    /// Remove the shard file; non-throwing if absent.
    pub fn clear(&self) {
        let path = self.shard_path();
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                warn!(error = %e, path = %path.display(), "checkpoint_clear_failed");
            }
        }
    }

    /// Enumerate `dir` for shard files, returning paths sorted by their
    /// embedded worker index. Files that don't match the shard pattern, or
    /// that can't be read, are skipped.
    pub fn find_shards(dir: &Path) -> CheckpointResult<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut found: Vec<(u32, PathBuf)> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(idx) = parse_worker_index(name) {
                found.push((idx, path));
            }
        }

        found.sort_by_key(|(idx, _)| *idx);
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }
}

/// Parse the worker index out of a `checkpoint-worker-NN.json` file name.
fn parse_worker_index(name: &str) -> Option<u32> {
    let stem = name.strip_prefix("checkpoint-worker-")?;
    let digits = stem.strip_suffix(".json")?;
    digits.parse().ok()
}
