//! Generic interpreter for declarative detection criteria.
//!
//! Evaluates definitions loaded from rule files that have no dedicated
//! implementation registered.

use std::path::PathBuf;

use glob::Pattern;
use strata_core::errors::RuleError;

use crate::rules::engine::{Rule, RuleContext};
use crate::rules::types::{RuleDefinition, Violation};
use crate::scanner::{layer_slot, ModuleDescriptor};

#[derive(Debug, Default, Clone, Copy)]
pub struct CriteriaRule;

impl Rule for CriteriaRule {
    fn validate(
        &self,
        module: &ModuleDescriptor,
        definition: &RuleDefinition,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError> {
        let mut out = Vec::new();
        check_dependencies(module, definition, &mut out)?;
        check_required_elements(module, definition, &mut out);
        check_child_order(module, definition, &mut out);
        check_file_patterns(module, definition, &mut out)?;
        check_package_patterns(module, definition, &mut out);
        Ok(out)
    }
}

fn compile(pattern: &str) -> Result<Pattern, RuleError> {
    Pattern::new(pattern).map_err(|e| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn compile_all(patterns: &[String]) -> Result<Vec<Pattern>, RuleError> {
    patterns.iter().map(|p| compile(p)).collect()
}

fn check_dependencies(
    module: &ModuleDescriptor,
    definition: &RuleDefinition,
    out: &mut Vec<Violation>,
) -> Result<(), RuleError> {
    let criteria = &definition.criteria.dependencies;
    if criteria.is_empty() {
        return Ok(());
    }
    if criteria.exceptions.iter().any(|e| e == &module.artifact_id) {
        return Ok(());
    }
    let exceptions = compile_all(&criteria.exceptions)?;
    let considered: Vec<&str> = module
        .dependencies
        .iter()
        .map(String::as_str)
        .filter(|dep| !exceptions.iter().any(|e| e.matches(dep)))
        .collect();

    for raw in &criteria.must_not_contain {
        let pattern = compile(raw)?;
        for dep in considered.iter().filter(|dep| pattern.matches(dep)) {
            out.push(definition.violation(
                module,
                format!("Dependency '{dep}' is not allowed here (matches '{raw}')"),
            ));
        }
    }
    for raw in &criteria.must_contain {
        let pattern = compile(raw)?;
        if !considered.iter().any(|dep| pattern.matches(dep)) {
            out.push(definition.violation(
                module,
                format!("No dependency matches required pattern '{raw}'"),
            ));
        }
    }
    Ok(())
}

fn check_required_elements(
    module: &ModuleDescriptor,
    definition: &RuleDefinition,
    out: &mut Vec<Violation>,
) {
    for element in &definition.criteria.structure.required_elements {
        if !module.descriptor.top_level_elements.contains(element) {
            out.push(
                definition
                    .violation(module, format!("Descriptor is missing required element <{element}>"))
                    .with_location(&module.descriptor_path),
            );
        }
    }
}

/// Declared children that fill a listed slot must appear in slot order.
fn check_child_order(module: &ModuleDescriptor, definition: &RuleDefinition, out: &mut Vec<Violation>) {
    let order = &definition.criteria.structure.required_child_order;
    if order.is_empty() {
        return;
    }
    let ranked: Vec<(&str, usize)> = module
        .declared_children()
        .filter_map(|name| {
            let slot = layer_slot(name)?;
            let rank = order.iter().position(|o| o == slot)?;
            Some((name, rank))
        })
        .collect();

    let out_of_order = ranked.windows(2).find(|pair| pair[0].1 > pair[1].1);
    if let Some(pair) = out_of_order {
        let found: Vec<&str> = ranked.iter().map(|(name, _)| *name).collect();
        out.push(
            definition
                .violation(
                    module,
                    format!(
                        "Module '{}' is declared before '{}'; expected slot order [{}], found [{}]",
                        pair[0].0,
                        pair[1].0,
                        order.join(", "),
                        found.join(", ")
                    ),
                )
                .with_location(&module.descriptor_path),
        );
    }
}

fn check_file_patterns(
    module: &ModuleDescriptor,
    definition: &RuleDefinition,
    out: &mut Vec<Violation>,
) -> Result<(), RuleError> {
    let base = Pattern::escape(&module.base_path.to_string_lossy());
    for raw in &definition.criteria.file_patterns {
        let full = format!("{base}/{raw}");
        let mut matches = glob::glob(&full).map_err(|e| RuleError::InvalidPattern {
            pattern: raw.clone(),
            message: e.to_string(),
        })?;
        if !matches.any(|entry| entry.is_ok()) {
            out.push(definition.violation(
                module,
                format!("No file matches required pattern '{raw}'"),
            ));
        }
    }
    Ok(())
}

fn check_package_patterns(
    module: &ModuleDescriptor,
    definition: &RuleDefinition,
    out: &mut Vec<Violation>,
) {
    let source_root = module.base_path.join("src").join("main").join("java");
    for package in &definition.criteria.package_patterns {
        let dir: PathBuf = package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(source_root.clone(), |acc, segment| acc.join(segment));
        if dir != source_root && dir.is_dir() {
            out.push(
                definition
                    .violation(module, format!("Forbidden package '{package}' exists"))
                    .with_location(dir),
            );
        }
    }
}
