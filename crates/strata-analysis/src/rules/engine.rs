//! Rule engine: evaluates enabled rule definitions against scanned modules.
//!
//! The engine never fails as a whole. A rule that errors or panics on a module
//! yields a Configuration-category violation for that rule and that module.

use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use strata_core::constants::MAX_VIOLATIONS_PER_RULE;
use strata_core::errors::RuleError;

use super::builtin::{CriteriaRule, MissingModulesRule, PureAggregatorRule};
use super::catalog::RuleCatalog;
use super::types::{RuleCategory, RuleDefinition, Severity, Violation};
use crate::scanner::ModuleDescriptor;

/// Evaluation context shared by every rule invocation of one run.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub project_root: &'a Path,
}

/// A structural check. Implementations are stateless and read-only after
/// construction so modules can be evaluated concurrently.
pub trait Rule: Send + Sync {
    /// Cheap pre-filter run before `validate`. Default: the definition's
    /// target filter and path patterns.
    fn applies_to(
        &self,
        module: &ModuleDescriptor,
        definition: &RuleDefinition,
        ctx: &RuleContext<'_>,
    ) -> bool {
        definition.targets.matches(module) && matches_path_patterns(module, definition, ctx)
    }

    /// Violations of `definition` in `module`. Ordinary non-matches return
    /// an empty list, never an error.
    fn validate(
        &self,
        module: &ModuleDescriptor,
        definition: &RuleDefinition,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Violation>, RuleError>;
}

/// Module path (relative to the project root) against `pathPatterns`.
/// No patterns means every path.
pub fn matches_path_patterns(
    module: &ModuleDescriptor,
    definition: &RuleDefinition,
    ctx: &RuleContext<'_>,
) -> bool {
    let patterns = &definition.criteria.path_patterns;
    if patterns.is_empty() {
        return true;
    }
    let relative = module.relative_path(ctx.project_root);
    patterns.iter().any(|p| {
        glob::Pattern::new(p)
            .map(|pattern| pattern.matches(&relative))
            .unwrap_or_else(|e| {
                tracing::warn!(rule = %definition.id, pattern = %p, error = %e, "invalid path pattern");
                false
            })
    })
}

/// Explicit registration table: rule id → implementation.
///
/// Definitions without a registered implementation fall back to the generic
/// criteria interpreter when they carry criteria, and are skipped otherwise.
#[derive(Clone)]
pub struct RuleSet {
    rules: HashMap<String, Arc<dyn Rule>>,
    fallback: Arc<dyn Rule>,
}

impl RuleSet {
    /// An empty table that only interprets criteria.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: Arc::new(CriteriaRule),
        }
    }

    /// The built-in registrations.
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        set.register("AGG-001", Arc::new(PureAggregatorRule));
        set.register("MOD-001", Arc::new(MissingModulesRule));
        set
    }

    /// Register (or replace) the implementation for `id`.
    pub fn register(&mut self, id: impl Into<String>, rule: Arc<dyn Rule>) {
        self.rules.insert(id.into(), rule);
    }

    /// The implementation evaluating `definition`, if any.
    pub fn resolve(&self, definition: &RuleDefinition) -> Option<Arc<dyn Rule>> {
        if let Some(rule) = self.rules.get(&definition.id) {
            return Some(Arc::clone(rule));
        }
        if !definition.criteria.is_empty() {
            return Some(Arc::clone(&self.fallback));
        }
        None
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Evaluates a catalog against a list of modules.
pub struct RuleEngine {
    rules: RuleSet,
    parallel: bool,
}

impl RuleEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            parallel: true,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate every enabled definition against every module.
    ///
    /// Output is grouped by module in the order given, then by rule id, so
    /// an unchanged tree always yields the same list.
    pub fn evaluate(
        &self,
        catalog: &RuleCatalog,
        modules: &[ModuleDescriptor],
        project_root: &Path,
    ) -> Vec<Violation> {
        let ctx = RuleContext { project_root };
        let resolved: Vec<(&RuleDefinition, Arc<dyn Rule>)> = catalog
            .enabled()
            .filter_map(|definition| match self.rules.resolve(definition) {
                Some(rule) => Some((definition, rule)),
                None => {
                    tracing::debug!(rule = %definition.id, "no implementation or criteria, rule skipped");
                    None
                }
            })
            .collect();

        let per_module = |module: &ModuleDescriptor| -> Vec<Violation> {
            resolved
                .iter()
                .flat_map(|(definition, rule)| evaluate_one(rule.as_ref(), module, definition, &ctx))
                .collect()
        };

        let nested: Vec<Vec<Violation>> = if self.parallel {
            modules.par_iter().map(per_module).collect()
        } else {
            modules.iter().map(per_module).collect()
        };
        let violations: Vec<Violation> = nested.into_iter().flatten().collect();

        tracing::info!(
            modules = modules.len(),
            rules = resolved.len(),
            violations = violations.len(),
            "rule evaluation complete"
        );
        violations
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RuleSet::builtin())
    }
}

fn evaluate_one(
    rule: &dyn Rule,
    module: &ModuleDescriptor,
    definition: &RuleDefinition,
    ctx: &RuleContext<'_>,
) -> Vec<Violation> {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        if !rule.applies_to(module, definition, ctx) {
            return Ok(Vec::new());
        }
        rule.validate(module, definition, ctx)
    }));

    match outcome {
        Ok(Ok(mut violations)) => {
            violations.retain(|v| {
                let own = v.rule_id == definition.id;
                if !own {
                    tracing::warn!(rule = %definition.id, emitted = %v.rule_id, "dropping violation with foreign rule id");
                }
                own
            });
            if violations.len() > MAX_VIOLATIONS_PER_RULE {
                tracing::debug!(
                    rule = %definition.id,
                    module = %module.artifact_id,
                    emitted = violations.len(),
                    "violation cap reached, truncating"
                );
                violations.truncate(MAX_VIOLATIONS_PER_RULE);
            }
            violations
        }
        Ok(Err(e)) => {
            tracing::warn!(rule = %definition.id, module = %module.artifact_id, error = %e, "rule evaluation failed");
            vec![configuration_violation(definition, module, e.to_string())]
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(rule = %definition.id, module = %module.artifact_id, panic = %message, "rule panicked");
            vec![configuration_violation(
                definition,
                module,
                format!("rule panicked: {message}"),
            )]
        }
    }
}

fn configuration_violation(
    definition: &RuleDefinition,
    module: &ModuleDescriptor,
    detail: String,
) -> Violation {
    definition
        .violation(
            module,
            format!("Rule {} could not be evaluated: {detail}", definition.id),
        )
        .with_category(RuleCategory::Configuration)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Rewrite the severity of violations whose rule id has an override.
/// Never adds or removes violations.
pub fn apply_severity_overrides(violations: &mut [Violation], overrides: &BTreeMap<String, String>) {
    if overrides.is_empty() {
        return;
    }
    let parsed: HashMap<&str, Severity> = overrides
        .iter()
        .filter_map(|(id, token)| match Severity::parse(token) {
            Some(severity) => Some((id.as_str(), severity)),
            None => {
                tracing::warn!(rule = %id, token = %token, "ignoring invalid severity override");
                None
            }
        })
        .collect();

    for violation in violations.iter_mut() {
        if let Some(severity) = parsed.get(violation.rule_id.as_str()) {
            violation.severity = *severity;
        }
    }
}
