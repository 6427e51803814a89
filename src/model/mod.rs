//! Tagged record types for the harness's core data model.
//!
//! Optional fields use `Option<T>`; enumerations (`SutRole`, `Direction`,
//! `Scope`, `ClaimStatus`) are Rust sum types rather than string tags.

pub mod aggregate;
pub mod case;
pub mod claim;
pub mod run;
pub mod sut;

pub use aggregate::{AggregatedResult, GroupInfo, PairwiseComparison, SummaryStats};
pub use case::{CaseDefinition, CaseInput, EvaluationCase};
pub use claim::{
    ClaimEvaluation, ClaimEvidence, ClaimStatus, ClaimSummary, Direction, EvaluationClaim, Scope,
};
pub use run::{Correctness, EvaluationResult, Metrics, Provenance, RunDescriptor};
pub use sut::{ConfigOverlay, Sut, SutFactory, SutOutcome, SutRole, SutRunError, SutSpec};
