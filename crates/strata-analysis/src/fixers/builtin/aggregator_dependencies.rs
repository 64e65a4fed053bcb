//! Removes the project-level dependency block of a pure aggregator.

use strata_core::constants::NO_CHANGES_NEEDED;
use strata_core::errors::FixError;

use super::apply_descriptor_edit;
use super::xml_edit::{find_elements, remove_spans};
use crate::fixers::types::{FixResult, Fixer, FixerContext};
use crate::rules::Violation;

/// Resolves `AGG-001`. `<dependencyManagement>` is left alone; only the
/// direct `<project><dependencies>` child is removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct AggregatorDependenciesFixer;

impl Fixer for AggregatorDependenciesFixer {
    fn name(&self) -> &str {
        "aggregator-dependencies"
    }

    fn supported_rules(&self) -> &[&str] {
        &["AGG-001"]
    }

    fn priority(&self) -> i32 {
        80
    }

    fn fix(&self, violation: &Violation, ctx: &mut FixerContext) -> Result<FixResult, FixError> {
        let path = ctx.descriptor_path();
        let original = ctx.read_file(&path)?;
        let blocks = find_elements(&original, &path, &["project", "dependencies"])?;
        if blocks.is_empty() {
            return Ok(FixResult::skipped(violation, NO_CHANGES_NEEDED));
        }

        let ranges: Vec<_> = blocks.into_iter().map(|b| b.range).collect();
        let updated = remove_spans(&original, &ranges);
        let description = format!("Removed dependency block from {}", ctx.display_path(&path));
        apply_descriptor_edit(violation, ctx, &path, &original, &updated, description)
    }
}
