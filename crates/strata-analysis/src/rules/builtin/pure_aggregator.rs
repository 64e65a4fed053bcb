//! AGG-001: pure aggregators must not declare dependencies.

use strata_core::errors::RuleError;

use crate::rules::engine::{Rule, RuleContext};
use crate::rules::types::{RuleDefinition, Violation};
use crate::scanner::ModuleDescriptor;

/// A pure aggregator only groups its children, so any project-level
/// dependency it declares leaks onto every child. One violation per module,
/// located at the module's base path.
#[derive(Debug, Default, Clone, Copy)]
pub struct PureAggregatorRule;

impl Rule for PureAggregatorRule {
    fn validate(
        &self,
        module: &ModuleDescriptor,
        definition: &RuleDefinition,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        if !module.is_pure_aggregator() || module.dependencies.is_empty() {
            return Ok(Vec::new());
        }
        let listed: Vec<&str> = module.dependencies.iter().map(String::as_str).collect();
        Ok(vec![definition.violation(
            module,
            format!(
                "Pure aggregator '{}' declares {} dependenc{}: {}",
                module.artifact_id,
                listed.len(),
                if listed.len() == 1 { "y" } else { "ies" },
                listed.join(", ")
            ),
        )])
    }
}
