//! Removes `<module>` entries that point at nothing.

use std::collections::BTreeSet;

use strata_core::constants::NO_CHANGES_NEEDED;
use strata_core::errors::FixError;

use super::apply_descriptor_edit;
use super::xml_edit::{find_elements, remove_spans};
use crate::fixers::types::{FixResult, Fixer, FixerContext};
use crate::rules::Violation;

/// Resolves `MOD-001` by dropping every declared module whose directory or
/// descriptor is missing. One invocation clears all of them, so later
/// violations for the same descriptor come back as "No changes needed".
#[derive(Debug, Default, Clone, Copy)]
pub struct MissingModuleEntriesFixer;

impl Fixer for MissingModuleEntriesFixer {
    fn name(&self) -> &str {
        "missing-module-entries"
    }

    fn supported_rules(&self) -> &[&str] {
        &["MOD-001"]
    }

    fn fix(&self, violation: &Violation, ctx: &mut FixerContext) -> Result<FixResult, FixError> {
        let path = ctx.descriptor_path();
        let original = ctx.read_file(&path)?;
        let entries = find_elements(&original, &path, &["project", "modules", "module"])?;

        let missing: Vec<_> = entries
            .into_iter()
            .filter(|entry| {
                !entry.text.is_empty()
                    && !ctx
                        .module_root()
                        .join(&entry.text)
                        .join(ctx.descriptor_file())
                        .is_file()
            })
            .collect();
        if missing.is_empty() {
            return Ok(FixResult::skipped(violation, NO_CHANGES_NEEDED));
        }

        let names: BTreeSet<&str> = missing.iter().map(|m| m.text.as_str()).collect();
        let description = format!(
            "Removed missing module entr{} {} from {}",
            if names.len() == 1 { "y" } else { "ies" },
            names.into_iter().collect::<Vec<_>>().join(", "),
            ctx.display_path(&path)
        );
        let ranges: Vec<_> = missing.iter().map(|m| m.range.clone()).collect();
        let updated = remove_spans(&original, &ranges);
        apply_descriptor_edit(violation, ctx, &path, &original, &updated, description)
    }
}
