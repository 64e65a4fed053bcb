//! Rules: definition catalog, the `Rule` trait and its registration table,
//! and the engine that evaluates rules against scanned modules.

pub mod builtin;
pub mod catalog;
pub mod engine;
pub mod properties;
pub mod types;

pub use builtin::{CriteriaRule, MissingModulesRule, PureAggregatorRule};
pub use catalog::{is_valid_rule_id, RuleCatalog, RuleSource, SourceFormat, BUILTIN_RULES};
pub use engine::{apply_severity_overrides, Rule, RuleEngine, RuleSet};
pub use types::{
    DependencyCriteria, DetectionCriteria, RuleCategory, RuleDefinition, Severity,
    StructuralCriteria, TargetFilter, Violation,
};
