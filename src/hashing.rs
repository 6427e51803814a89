//! Deterministic run-id and config-hash derivation.
//!
//! Run ids and config hashes are SHA-256 digests of canonical JSON, truncated
//! to a fixed hex length. Canonicalization sorts object keys at every nesting
//! level (lexicographic) so that property order never affects the digest;
//! array order is preserved since arrays are positional.
//!
//! Grounded on `auth::hash_api_key`'s `sha2::Sha256` + `format!("{:x}", ...)`
//! idiom, generalized from a single string to canonicalized JSON of arbitrary
//! serializable inputs.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length in hex characters of a run id.
pub const RUN_ID_LEN: usize = 16;
/// Length in hex characters of a config hash.
pub const CONFIG_HASH_LEN: usize = 8;

/// Result of parsing a candidate run-id string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRunId {
    pub valid: bool,
    pub length: usize,
}

/// Recursively rebuild a `serde_json::Value`, sorting object keys at every
/// nesting level. Arrays keep their original element order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k.clone(), canonicalize(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Serialize `inputs` to canonical JSON: keys sorted at every nesting level.
fn canonical_json<T: Serialize>(inputs: &T) -> serde_json::Result<String> {
    let value = serde_json::to_value(inputs)?;
    let canonical = canonicalize(&value);
    serde_json::to_string(&canonical)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Derive a deterministic 16-hex-char run id from canonicalized `inputs`.
///
/// Two inputs whose canonical JSON forms are equal (regardless of original
/// key order) produce the same id.
pub fn generate_run_id<T: Serialize>(inputs: &T) -> serde_json::Result<String> {
    let canonical = canonical_json(inputs)?;
    let digest = sha256_hex(canonical.as_bytes());
    Ok(digest[..RUN_ID_LEN].to_string())
}

/// Derive a deterministic 8-hex-char config hash from canonicalized `kv`.
pub fn generate_config_hash<T: Serialize>(kv: &T) -> serde_json::Result<String> {
    let canonical = canonical_json(kv)?;
    let digest = sha256_hex(canonical.as_bytes());
    Ok(digest[..CONFIG_HASH_LEN].to_string())
}

/// Recompute the run id for `inputs` and compare it against `candidate`.
pub fn validate_run_id<T: Serialize>(candidate: &str, inputs: &T) -> bool {
    match generate_run_id(inputs) {
        Ok(recomputed) => recomputed == candidate,
        Err(_) => false,
    }
}

/// Check whether `s` is a well-formed 16-hex-char run id, without recomputing
/// anything.
pub fn parse_run_id(s: &str) -> ParsedRunId {
    let length = s.len();
    let valid = length == RUN_ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit());
    ParsedRunId { valid, length }
}
