//! System-under-test specification and instance contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Role a SUT plays within a claim comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SutRole {
    Primary,
    Baseline,
}

impl std::fmt::Display for SutRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SutRole::Primary => write!(f, "primary"),
            SutRole::Baseline => write!(f, "baseline"),
        }
    }
}

/// A key/value configuration overlay, opaque to the core.
pub type ConfigOverlay = HashMap<String, serde_json::Value>;

/// Static description of a system under test.
///
/// `id` encodes `name-vMAJOR.MINOR.PATCH` and is the stable key across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SutSpec {
    pub id: String,
    pub name: String,
    pub version: String,
    pub role: SutRole,
    #[serde(default)]
    pub config_defaults: ConfigOverlay,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Opaque, SUT-family-specific result of one execution.
///
/// The core only requires a flat numeric metrics map; everything else
/// (`outputs`) is passed through unexamined.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SutOutcome {
    /// Flat `{metric name -> value}` map. No NaN values for recorded keys.
    pub numeric: HashMap<String, f64>,
    /// Opaque payload returned by the SUT, preserved for downstream tooling.
    #[serde(default)]
    pub outputs: serde_json::Value,
    /// Whether the SUT considers its own output valid given the inputs.
    #[serde(default = "default_true")]
    pub valid: bool,
    /// Whether the produced output matched a known-expected value, if any.
    pub matches_expected: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// Error returned by a SUT's `run` invocation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("SUT run failed: {0}")]
pub struct SutRunError(pub String);

/// An executable instance of a SUT, produced by a registry factory.
///
/// A polymorphic-over-capability abstraction: anything implementing `run`
/// can stand in for a SUT, replacing ad-hoc factory closures.
pub trait Sut: Send + Sync {
    /// The stable id of this instance; must match the `SutSpec` it was
    /// created from.
    fn id(&self) -> &str;

    /// Execute the SUT against one case's per-run inputs.
    fn run(&self, inputs: &serde_json::Value) -> Result<SutOutcome, SutRunError>;
}

/// A factory that, given an optional config overlay, builds an executable
/// SUT instance. Must not retain mutable shared state across instances.
pub type SutFactory = Box<dyn Fn(Option<&ConfigOverlay>) -> Box<dyn Sut> + Send + Sync>;
