//! Per-run report generation and atomic JSON output.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use strata_core::constants::VERSION;
use strata_core::errors::ReportError;

use super::types::{FixBuckets, FixReport, ReportMetadata, ReportStatus, ReportSummary, RuleRollup};
use crate::fixers::{FixResult, FixStatus, FixSummary};
use crate::rules::Violation;

/// Builds a `FixReport` from a run's results.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    project_path: PathBuf,
    dry_run: bool,
    duration_ms: u64,
}

impl ReportGenerator {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            dry_run: false,
            duration_ms: 0,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn generate(
        &self,
        fixes: &[FixResult],
        summary: &FixSummary,
        violations: &[Violation],
    ) -> FixReport {
        let mut buckets = FixBuckets::default();
        let mut rules: BTreeMap<String, RuleRollup> = BTreeMap::new();

        for fix in fixes {
            let rollup = rules.entry(fix.violation.rule_id.clone()).or_default();
            rollup.total += 1;
            if rollup.example.is_none() {
                rollup.example = Some(fix.violation.message.clone());
            }
            match fix.status {
                FixStatus::Fixed => {
                    rollup.fixed += 1;
                    buckets.successful.push(fix.clone());
                }
                FixStatus::DryRun => {
                    rollup.dry_run += 1;
                    buckets.dry_run.push(fix.clone());
                }
                FixStatus::Skipped | FixStatus::NotFixable => {
                    rollup.skipped += 1;
                    buckets.skipped.push(fix.clone());
                }
                FixStatus::Failed | FixStatus::ParseError | FixStatus::ValidationFailed => {
                    rollup.failed += 1;
                    buckets.failed.push(fix.clone());
                }
            }
        }

        let mut violations_by_rule: BTreeMap<String, Vec<Violation>> = BTreeMap::new();
        for violation in violations {
            violations_by_rule
                .entry(violation.rule_id.clone())
                .or_default()
                .push(violation.clone());
        }

        FixReport {
            metadata: ReportMetadata {
                generated_at: chrono::Utc::now().to_rfc3339(),
                project_path: self.project_path.display().to_string(),
                duration_ms: self.duration_ms,
                version: VERSION.to_string(),
                dry_run: self.dry_run,
            },
            status: ReportStatus::from_summary(summary),
            summary: ReportSummary {
                counts: *summary,
                success_rate: summary.success_rate(),
            },
            fixes: buckets,
            rules,
            violations_by_rule,
        }
    }
}

/// Pretty-printed JSON.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ReportError> {
    serde_json::to_string_pretty(value).map_err(|e| ReportError::Serialization(e.to_string()))
}

/// Write `report` to `path` via a sibling temp file and a rename, so readers
/// never see a partial document.
pub fn write_report<T: serde::Serialize>(path: &Path, report: &T) -> Result<(), ReportError> {
    let json = to_json(report)?;
    write_atomic(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, bytes).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}
