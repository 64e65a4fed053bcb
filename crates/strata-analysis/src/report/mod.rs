//! Report generation: per-run JSON reports and the consolidated
//! multi-module report.

pub mod consolidate;
pub mod generator;
pub mod types;

pub use consolidate::{merge_into, merge_into_file, read_consolidated, ConsolidatedReport, ModuleEntry};
pub use generator::{to_json, write_report, ReportGenerator};
pub use types::{FixBuckets, FixReport, ReportMetadata, ReportStatus, ReportSummary, RuleRollup};
