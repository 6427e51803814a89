//! Grouped statistical summaries produced by the aggregator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary statistics for one metric within a (SUT, case-class) partition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SummaryStats {
    pub n: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

/// Statistical comparison of the primary SUT against one baseline SUT.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PairwiseComparison {
    pub p_value: Option<f64>,
    pub effect_size: Option<f64>,
    pub u_statistic: Option<f64>,
}

/// Descriptive info about the group a partition was computed over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GroupInfo {
    pub case_count: usize,
}

/// One (SUT, case-class) partition's computed aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub sut: String,
    pub case_class: String,
    pub group: GroupInfo,
    pub metrics: HashMap<String, SummaryStats>,
    /// Keyed by baseline `sutId`; only populated on the primary SUT's
    /// aggregate.
    #[serde(default)]
    pub comparisons: HashMap<String, HashMap<String, PairwiseComparison>>,
}
