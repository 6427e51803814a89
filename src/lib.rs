//! # casebench
//!
//! An empirical evaluation harness for graph algorithms: a claim-driven
//! experiment framework built around a registry of systems under test and
//! cases, a parallel sharded crash-resumable executor, a result collector,
//! a statistical aggregator, and a claim evaluator.
//!
//! ## Pipeline
//!
//! 1. Register [`model::Sut`] implementations and [`model::CaseDefinition`]s
//!    in a [`registry::SutRegistry`] and [`registry::CaseRegistry`].
//! 2. Hand both registries to an [`executor::ParallelExecutor`], which
//!    plans the full (SUT, case, repetition) cross product, shards it
//!    deterministically across workers, and executes it with crash-safe
//!    checkpointing.
//! 3. Feed the merged results into a [`collector::ResultCollector`] for
//!    validation and querying.
//! 4. Run the validated results through [`aggregator::Aggregator`] to get
//!    per-(SUT, case-class) summary statistics and pairwise comparisons.
//! 5. Evaluate declared [`model::EvaluationClaim`]s against the aggregates
//!    with [`claims::ClaimEvaluator`] to get satisfied/violated/
//!    inconclusive verdicts.
//!
//! See [`cli`] for a reference driver that wires all five stages together.

pub mod aggregator;
pub mod checkpoint;
pub mod claims;
pub mod cli;
pub mod collector;
pub mod config;
pub mod errors;
pub mod executor;
pub mod hashing;
pub mod model;
pub mod registry;

pub use errors::{CasebenchError, CasebenchResult};
