//! Consolidated multi-module report.
//!
//! Sibling module runs merge into one file. The read-merge-write is done
//! under an exclusive `fd-lock` on `<output>.lock`, so concurrent processes
//! writing the same consolidated report serialize.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_core::errors::ReportError;

use super::generator::{to_json, write_atomic};
use super::types::{FixReport, ReportStatus};
use crate::fixers::FixSummary;

/// One module's latest run inside the consolidated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Consolidation key.
    pub module: String,
    pub status: ReportStatus,
    pub summary: FixSummary,
    pub violations: usize,
    pub report: FixReport,
}

impl ModuleEntry {
    pub fn from_report(module: impl Into<String>, report: FixReport) -> Self {
        Self {
            module: module.into(),
            status: report.status,
            summary: report.summary.counts,
            violations: report.violations_by_rule.values().map(Vec::len).sum(),
            report,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub generated_at: String,
    pub modules: Vec<ModuleEntry>,
    pub totals: FixSummary,
}

impl Default for ConsolidatedReport {
    fn default() -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            modules: Vec::new(),
            totals: FixSummary::default(),
        }
    }
}

impl ConsolidatedReport {
    pub fn module(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.iter().find(|m| m.module == name)
    }
}

/// Merge `entry` into `existing`, replacing the entry with the same module
/// name in place, and recompute the totals.
pub fn merge_into(mut existing: ConsolidatedReport, entry: ModuleEntry) -> ConsolidatedReport {
    match existing.modules.iter_mut().find(|m| m.module == entry.module) {
        Some(slot) => *slot = entry,
        None => existing.modules.push(entry),
    }
    existing.totals = existing.modules.iter().fold(FixSummary::default(), |acc, m| FixSummary {
        total: acc.total + m.summary.total,
        fixed: acc.fixed + m.summary.fixed,
        dry_run: acc.dry_run + m.summary.dry_run,
        skipped: acc.skipped + m.summary.skipped,
        not_fixable: acc.not_fixable + m.summary.not_fixable,
        failed: acc.failed + m.summary.failed,
        parse_errors: acc.parse_errors + m.summary.parse_errors,
        validation_failed: acc.validation_failed + m.summary.validation_failed,
    });
    existing.generated_at = chrono::Utc::now().to_rfc3339();
    existing
}

/// Read a consolidated report. A missing or empty file is an empty report.
pub fn read_consolidated(path: &Path) -> Result<ConsolidatedReport, ReportError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ConsolidatedReport::default()),
        Err(source) => {
            return Err(ReportError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if content.trim().is_empty() {
        return Ok(ConsolidatedReport::default());
    }
    serde_json::from_str(&content)
        .map_err(|e| ReportError::Serialization(format!("{}: {e}", path.display())))
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

/// Merge `entry` into the consolidated report at `path` under the file lock.
pub fn merge_into_file(path: &Path, entry: ModuleEntry) -> Result<ConsolidatedReport, ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let lock_file = lock_path(path);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_file)
        .map_err(|source| ReportError::Lock {
            path: lock_file.clone(),
            source,
        })?;
    let mut lock = fd_lock::RwLock::new(file);
    let _guard = lock.write().map_err(|source| ReportError::Lock {
        path: lock_file.clone(),
        source,
    })?;

    let module = entry.module.clone();
    let merged = merge_into(read_consolidated(path)?, entry);
    write_atomic(path, to_json(&merged)?.as_bytes())?;
    tracing::info!(path = %path.display(), module = %module, modules = merged.modules.len(), "consolidated report updated");
    Ok(merged)
}
