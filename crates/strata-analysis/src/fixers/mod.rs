//! Fixers: the `Fixer` trait, the priority-ordered registry, built-in
//! descriptor fixers, and the orchestrator that applies them.

pub mod builtin;
pub mod diff;
pub mod orchestrator;
pub mod registry;
pub mod types;

pub use builtin::{AggregatorDependenciesFixer, MissingModuleEntriesFixer};
pub use diff::unified_diff;
pub use orchestrator::{FixOrchestrator, FixRun, FixSummary};
pub use registry::FixerRegistry;
pub use types::{FixResult, FixStatus, Fixer, FixerContext};
