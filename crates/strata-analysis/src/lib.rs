//! Strata analysis engine.
//!
//! Pipeline: `scanner` builds the module tree, `rules` loads definitions and
//! evaluates them into violations, `fixers` resolves violations through
//! `backup` transactions, and `report` serializes the outcome.

pub mod backup;
pub mod fixers;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod scanner;

pub use pipeline::{Evaluation, Pipeline, PipelineOutcome};
