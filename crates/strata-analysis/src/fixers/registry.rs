//! Fixer registry: explicit registration table ordered by priority.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use super::builtin::{AggregatorDependenciesFixer, MissingModuleEntriesFixer};
use super::types::Fixer;
use crate::rules::Violation;

/// Thread-safe table of fixers plus the administrative disable list.
///
/// An owned instance passed through the pipeline; `reset()` empties it
/// for test isolation.
#[derive(Default)]
pub struct FixerRegistry {
    fixers: RwLock<Vec<Arc<dyn Fixer>>>,
    disabled: RwLock<HashSet<String>>,
}

impl FixerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in fixers.
    pub fn builtin() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(AggregatorDependenciesFixer));
        registry.register(Arc::new(MissingModuleEntriesFixer));
        registry
    }

    /// Add `fixer`, replacing any fixer with the same name.
    pub fn register(&self, fixer: Arc<dyn Fixer>) {
        let mut fixers = self.fixers.write().unwrap_or_else(PoisonError::into_inner);
        fixers.retain(|f| f.name() != fixer.name());
        tracing::debug!(fixer = fixer.name(), priority = fixer.priority(), "fixer registered");
        fixers.push(fixer);
    }

    /// Remove the fixer named `name`. Returns whether one was registered.
    pub fn remove(&self, name: &str) -> bool {
        let mut fixers = self.fixers.write().unwrap_or_else(PoisonError::into_inner);
        let before = fixers.len();
        fixers.retain(|f| f.name() != name);
        fixers.len() != before
    }

    /// Every fixer supporting `rule_id`, highest priority first. Equal
    /// priorities keep name order so selection never depends on
    /// registration order.
    pub fn find_fixers_for_rule(&self, rule_id: &str) -> Vec<Arc<dyn Fixer>> {
        let fixers = self.fixers.read().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<Arc<dyn Fixer>> = fixers
            .iter()
            .filter(|f| f.supported_rules().contains(&rule_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        found
    }

    /// The highest-priority enabled fixer accepting `violation`.
    pub fn find_fixer_for(&self, violation: &Violation) -> Option<Arc<dyn Fixer>> {
        self.find_fixers_for_rule(&violation.rule_id)
            .into_iter()
            .find(|f| !self.is_disabled(f.name()) && f.can_fix(violation))
    }

    pub fn disable(&self, name: &str) {
        self.disabled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string());
    }

    pub fn enable(&self, name: &str) {
        self.disabled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Drop every registration and re-enable everything.
    pub fn reset(&self) {
        self.fixers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.disabled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .fixers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.fixers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
