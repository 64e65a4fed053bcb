//! Built-in fixers and the shared edit-apply path.

mod aggregator_dependencies;
mod missing_modules;
pub mod xml_edit;

pub use aggregator_dependencies::AggregatorDependenciesFixer;
pub use missing_modules::MissingModuleEntriesFixer;

use std::path::Path;

use strata_core::errors::FixError;

use super::diff::unified_diff;
use super::types::{FixResult, FixerContext};
use crate::rules::Violation;
use crate::scanner::XmlDescriptorParser;

/// Validate `updated`, then either return it as a dry-run preview or write
/// it through the context's transaction. The diff is identical in both modes.
pub(crate) fn apply_descriptor_edit(
    violation: &Violation,
    ctx: &mut FixerContext,
    path: &Path,
    original: &str,
    updated: &str,
    description: String,
) -> Result<FixResult, FixError> {
    XmlDescriptorParser::new()
        .parse_str(updated, path)
        .map_err(|e| FixError::ValidationFailed {
            path: path.to_path_buf(),
            message: format!("edited descriptor no longer parses: {e}"),
        })?;

    let diff = unified_diff(&ctx.display_path(path), original, updated);
    if ctx.is_dry_run() {
        return Ok(FixResult::dry_run(violation, description, vec![diff]));
    }
    ctx.write_file(path, updated)?;
    Ok(FixResult::fixed(
        violation,
        description,
        vec![path.to_path_buf()],
        vec![diff],
    ))
}
