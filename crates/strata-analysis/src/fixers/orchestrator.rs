//! Fix orchestrator: resolves violations through the registry, one
//! transaction per fixer invocation.

use std::collections::{BTreeMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use strata_core::errors::TransactionError;
use strata_core::traits::{Cancellable, CancellationToken};

use super::registry::FixerRegistry;
use super::types::{FixResult, FixStatus, Fixer, FixerContext};
use crate::backup::BackupManager;
use crate::rules::Violation;

/// Counts per status over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSummary {
    pub total: usize,
    pub fixed: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub not_fixable: usize,
    pub failed: usize,
    pub parse_errors: usize,
    pub validation_failed: usize,
}

impl FixSummary {
    pub fn from_results(results: &[FixResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result.status);
        }
        summary
    }

    pub fn record(&mut self, status: FixStatus) {
        self.total += 1;
        match status {
            FixStatus::Fixed => self.fixed += 1,
            FixStatus::DryRun => self.dry_run += 1,
            FixStatus::Skipped => self.skipped += 1,
            FixStatus::NotFixable => self.not_fixable += 1,
            FixStatus::Failed => self.failed += 1,
            FixStatus::ParseError => self.parse_errors += 1,
            FixStatus::ValidationFailed => self.validation_failed += 1,
        }
    }

    /// Failed, parse-error, and validation-failed results together.
    pub fn failures(&self) -> usize {
        self.failed + self.parse_errors + self.validation_failed
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }

    /// Share of results that were fixed or previewed, in `[0, 1]`.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.fixed + self.dry_run) as f64 / self.total as f64
    }
}

/// Results of one `fix_all` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixRun {
    pub results: Vec<FixResult>,
    pub summary: FixSummary,
    /// Cancellation stopped the run before every violation was visited.
    pub cancelled: bool,
    pub duration_ms: u64,
}

/// Groups violations by rule and drives the best fixer for each.
pub struct FixOrchestrator {
    registry: Arc<FixerRegistry>,
    backups: BackupManager,
    disabled_rules: HashSet<String>,
    disabled_fixers: HashSet<String>,
}

impl FixOrchestrator {
    pub fn new(registry: Arc<FixerRegistry>, backups: BackupManager) -> Self {
        Self {
            registry,
            backups,
            disabled_rules: HashSet::new(),
            disabled_fixers: HashSet::new(),
        }
    }

    /// Violations of these rules are dropped before fixing.
    pub fn with_disabled_rules(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.disabled_rules = ids.into_iter().collect();
        self
    }

    /// Fixers treated as disabled for this orchestrator only, on top of
    /// the registry's own disable list.
    pub fn with_disabled_fixers(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.disabled_fixers = names.into_iter().collect();
        self
    }

    fn is_disabled(&self, fixer: &dyn Fixer) -> bool {
        self.disabled_fixers.contains(fixer.name()) || self.registry.is_disabled(fixer.name())
    }

    pub fn registry(&self) -> &FixerRegistry {
        &self.registry
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Resolve `violations` under `ctx`. Per-fix failures become results;
    /// only a rollback that could not restore files is returned as an error.
    pub fn fix_all(
        &self,
        violations: &[Violation],
        ctx: &FixerContext,
        cancel: &CancellationToken,
    ) -> Result<FixRun, TransactionError> {
        let start = Instant::now();
        let mut groups: BTreeMap<&str, Vec<&Violation>> = BTreeMap::new();
        for violation in violations {
            if self.disabled_rules.contains(&violation.rule_id) {
                tracing::debug!(rule = %violation.rule_id, "rule disabled, violation not fixed");
                continue;
            }
            groups.entry(violation.rule_id.as_str()).or_default().push(violation);
        }

        let mut run = FixRun::default();
        'groups: for (rule_id, group) in groups {
            let fixers = self.registry.find_fixers_for_rule(rule_id);
            let Some(best) = fixers.first() else {
                tracing::debug!(rule = rule_id, count = group.len(), "no fixer registered");
                run.results.extend(group.into_iter().map(|v| {
                    FixResult::not_fixable(v, format!("No fixer registered for {rule_id}"))
                }));
                continue;
            };
            if self.is_disabled(best.as_ref()) {
                tracing::info!(rule = rule_id, fixer = best.name(), "fixer disabled, skipping group");
                run.results.extend(group.into_iter().map(|v| {
                    FixResult::skipped(v, format!("Fixer '{}' is disabled", best.name()))
                        .with_fixer(best.name())
                }));
                continue;
            }

            for violation in group {
                if cancel.is_cancelled() {
                    tracing::info!(completed = run.results.len(), "fix run cancelled");
                    run.cancelled = true;
                    break 'groups;
                }
                let fixer = if best.can_fix(violation) {
                    Some(Arc::clone(best))
                } else {
                    fixers
                        .iter()
                        .find(|f| !self.is_disabled(f.as_ref()) && f.can_fix(violation))
                        .cloned()
                };
                let result = match fixer {
                    Some(fixer) => self.invoke(fixer.as_ref(), violation, ctx)?,
                    None => FixResult::not_fixable(
                        violation,
                        format!("No enabled fixer accepts this {rule_id} violation"),
                    ),
                };
                run.results.push(result);
            }
        }

        run.summary = FixSummary::from_results(&run.results);
        run.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            total = run.summary.total,
            fixed = run.summary.fixed,
            dry_run = run.summary.dry_run,
            skipped = run.summary.skipped,
            not_fixable = run.summary.not_fixable,
            failures = run.summary.failures(),
            "fix run complete"
        );
        Ok(run)
    }

    /// One fixer call in its own transaction: `Fixed` commits, anything
    /// else rolls back.
    fn invoke(
        &self,
        fixer: &dyn Fixer,
        violation: &Violation,
        base: &FixerContext,
    ) -> Result<FixResult, TransactionError> {
        let mut ctx = base.for_violation(violation);
        if !ctx.is_dry_run() {
            ctx = ctx.with_transaction(self.backups.begin_transaction());
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| fixer.fix(violation, &mut ctx)));
        let mut result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(fixer = fixer.name(), rule = %violation.rule_id, error = %e, "fix failed");
                FixResult::from_error(violation, &e)
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(fixer = fixer.name(), rule = %violation.rule_id, panic = %message, "fixer panicked");
                FixResult::failed(violation, format!("fixer panicked: {message}"))
            }
        };
        result.fixer = Some(fixer.name().to_string());
        if result.status != FixStatus::Fixed {
            result.modified_files.clear();
        }

        if let Some(mut transaction) = ctx.take_transaction() {
            if result.status == FixStatus::Fixed {
                if let Err(e) = transaction.commit() {
                    tracing::warn!(error = %e, "commit failed");
                    result = FixResult::failed(violation, e.to_string()).with_fixer(fixer.name());
                }
            } else if let Err(e) = transaction.rollback() {
                if e.is_fatal() {
                    return Err(e);
                }
                tracing::warn!(error = %e, "rollback skipped");
            }
        }
        Ok(result)
    }
}
