//! Case specification and resource-loading contract.

use serde::{Deserialize, Serialize};

/// Static description of one (graph + inputs) case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationCase {
    pub case_id: String,
    pub name: String,
    /// Grouping key used for aggregation (e.g. "social", "citation").
    pub case_class: String,
    /// Per-run argument structure handed to the SUT; opaque to the core.
    pub inputs: serde_json::Value,
    pub version: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Heavyweight resource a case lazily loads (e.g. a parsed graph). Opaque to
/// the core — it is only ever handed back to the SUT via `get_inputs`.
pub type CaseInput = std::sync::Arc<serde_json::Value>;

/// A registered case: its static description plus the two loader factories.
///
/// `get_input` is a blocking call (no async runtime); `get_inputs` is
/// always synchronous. Neither factory is cached by the registry itself —
/// callers (worker caches) own that responsibility.
pub struct CaseDefinition {
    pub case: EvaluationCase,
    pub get_input: Box<dyn Fn() -> Result<CaseInput, String> + Send + Sync>,
    pub get_inputs: Box<dyn Fn() -> serde_json::Value + Send + Sync>,
}

impl std::fmt::Debug for CaseDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseDefinition")
            .field("case", &self.case)
            .finish_non_exhaustive()
    }
}
