//! Scan → evaluate → fix → report, wired from a `StrataConfig`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use strata_core::config::StrataConfig;
use strata_core::errors::{ConfigError, PipelineError, ScanError};
use strata_core::traits::CancellationToken;

use crate::backup::BackupManager;
use crate::fixers::{FixOrchestrator, FixRun, FixerContext, FixerRegistry};
use crate::report::{merge_into_file, write_report, FixReport, ModuleEntry, ReportGenerator};
use crate::rules::{apply_severity_overrides, RuleCatalog, RuleEngine, RuleSet, Violation};
use crate::scanner::{ModuleDescriptor, ModuleScanner, SkippedDescriptor};

/// Scan and evaluation results, before any fixing.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub modules: Vec<ModuleDescriptor>,
    pub skipped: Vec<SkippedDescriptor>,
    pub catalog: RuleCatalog,
    pub violations: Vec<Violation>,
}

/// Everything a full run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub modules_scanned: usize,
    pub skipped: Vec<SkippedDescriptor>,
    pub violations: Vec<Violation>,
    pub fix_run: FixRun,
    pub report: FixReport,
    /// Staged backups deleted after a clean run.
    pub backups_cleaned: usize,
}

pub struct Pipeline {
    config: StrataConfig,
    rules: RuleSet,
    fixers: Arc<FixerRegistry>,
}

impl Pipeline {
    /// Built-in rules and fixers.
    pub fn new(config: StrataConfig) -> Self {
        Self {
            config,
            rules: RuleSet::builtin(),
            fixers: Arc::new(FixerRegistry::builtin()),
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_fixers(mut self, fixers: Arc<FixerRegistry>) -> Self {
        self.fixers = fixers;
        self
    }

    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    pub fn fixers(&self) -> &FixerRegistry {
        &self.fixers
    }

    /// Scan `root` and evaluate the configured catalog, with severity
    /// overrides applied. Nothing on disk changes.
    pub fn evaluate_only(&self, root: &Path) -> Result<Evaluation, PipelineError> {
        self.evaluate(&resolve_root(root)?, &CancellationToken::new())
    }

    fn evaluate(&self, root: &Path, cancel: &CancellationToken) -> Result<Evaluation, PipelineError> {
        let scan = ModuleScanner::from_config(&self.config)
            .scan_with_cancel(root, cancel)
            .map_err(|e| match e {
                ScanError::Cancelled => PipelineError::Cancelled,
                other => PipelineError::Scan(other),
            })?;
        let catalog = RuleCatalog::from_config(root, &self.config.rules)?;

        let engine = RuleEngine::new(self.rules.clone()).parallel(self.config.scan.effective_parallel());
        let mut violations = engine.evaluate(&catalog, &scan.modules, root);
        apply_severity_overrides(&mut violations, &self.config.rules.severity_overrides);

        Ok(Evaluation {
            modules: scan.modules,
            skipped: scan.skipped,
            catalog,
            violations,
        })
    }

    /// Full run. Writes the report and the consolidated report when
    /// configured, and cleans staged backups after a run without failures
    /// when `cleanup_on_success` is set.
    ///
    /// `fix.disabled_fixers` applies to this run only; the shared registry
    /// is left as it was.
    pub fn run(&self, root: &Path, cancel: &CancellationToken) -> Result<PipelineOutcome, PipelineError> {
        let start = Instant::now();
        let root = resolve_root(root)?;
        let root = root.as_path();
        // The scanner prunes the staging dir, so a module inside it would
        // look missing and get dropped from its aggregator.
        let backups = BackupManager::from_config(root, &self.config.fix)?;
        let descriptor_file = self.config.scan.effective_descriptor_file();
        if let Some(descriptor) = descriptor_under(backups.staging_dir(), descriptor_file) {
            return Err(ConfigError::ValidationFailed {
                field: "fix.backup_dir".to_string(),
                message: format!(
                    "staging directory {} holds module descriptor {}",
                    backups.staging_dir().display(),
                    descriptor.display()
                ),
            }
            .into());
        }

        let evaluation = self.evaluate(root, cancel)?;
        let dry_run = self.config.fix.effective_dry_run();

        let ctx = FixerContext::new(root)
            .with_dry_run(dry_run)
            .with_descriptor_file(descriptor_file);
        let orchestrator = FixOrchestrator::new(Arc::clone(&self.fixers), backups.clone())
            .with_disabled_rules(self.config.rules.disabled.iter().cloned())
            .with_disabled_fixers(self.config.fix.disabled_fixers.iter().cloned());
        let fix_run = orchestrator.fix_all(&evaluation.violations, &ctx, cancel)?;

        let report = ReportGenerator::new(root)
            .dry_run(dry_run)
            .duration_ms(start.elapsed().as_millis() as u64)
            .generate(&fix_run.results, &fix_run.summary, &evaluation.violations);

        if let Some(output) = &self.config.report.output {
            write_report(&StrataConfig::resolve_path(root, output), &report)?;
        }
        if let Some(consolidated) = &self.config.report.consolidated {
            let module = self.module_name(root);
            merge_into_file(
                &StrataConfig::resolve_path(root, consolidated),
                ModuleEntry::from_report(module, report.clone()),
            )?;
        }

        let clean_run = !dry_run && !fix_run.cancelled && !fix_run.summary.has_failures();
        let backups_cleaned = if clean_run && self.config.fix.effective_cleanup_on_success() {
            backups.cleanup()?
        } else {
            0
        };

        tracing::info!(
            root = %root.display(),
            modules = evaluation.modules.len(),
            violations = evaluation.violations.len(),
            status = ?report.status,
            "pipeline run complete"
        );

        Ok(PipelineOutcome {
            modules_scanned: evaluation.modules.len(),
            skipped: evaluation.skipped,
            violations: evaluation.violations,
            fix_run,
            report,
            backups_cleaned,
        })
    }

    fn module_name(&self, root: &Path) -> String {
        self.config
            .report
            .module_name
            .clone()
            .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "root".to_string())
    }
}

/// Absolute form of `root`, so every scanned path and every fixer path
/// share one prefix.
fn resolve_root(root: &Path) -> Result<PathBuf, PipelineError> {
    root.canonicalize().map_err(|_| {
        PipelineError::Scan(ScanError::RootNotFound {
            path: root.to_path_buf(),
        })
    })
}

fn descriptor_under(dir: &Path, descriptor_file: &str) -> Option<PathBuf> {
    let pattern = format!(
        "{}/**/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(descriptor_file)
    );
    glob::glob(&pattern).ok()?.flatten().next()
}
