//! MOD-001: every declared child module must exist.

use strata_core::errors::RuleError;

use crate::rules::engine::{Rule, RuleContext};
use crate::rules::types::{RuleDefinition, Violation};
use crate::scanner::ModuleDescriptor;

/// One violation per declared child whose directory or descriptor is
/// missing. Violations point at the declaring descriptor, the file a fix edits.
#[derive(Debug, Default, Clone, Copy)]
pub struct MissingModulesRule;

impl Rule for MissingModulesRule {
    fn validate(
        &self,
        module: &ModuleDescriptor,
        definition: &RuleDefinition,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        Ok(module
            .children
            .iter()
            .filter(|child| !child.present)
            .map(|child| {
                let what = if child.path.is_dir() {
                    "has no build descriptor"
                } else {
                    "does not exist"
                };
                definition
                    .violation(
                        module,
                        format!("Declared module '{}' {what} ({})", child.name, child.path.display()),
                    )
                    .with_location(&module.descriptor_path)
            })
            .collect())
    }
}
