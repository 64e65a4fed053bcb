//! Fixer configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BACKUP_DIR;

/// Configuration for fix orchestration and backups.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FixConfig {
    /// Compute diffs without touching files. Default: false.
    pub dry_run: Option<bool>,
    /// Fixer names that are administratively disabled.
    #[serde(default)]
    pub disabled_fixers: Vec<String>,
    /// Staging directory relative to the project root. Default: ".strata-backups".
    pub backup_dir: Option<String>,
    /// Delete staged backups after a run without failures. Default: false.
    pub cleanup_on_success: Option<bool>,
}

impl FixConfig {
    pub fn effective_dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }

    pub fn effective_backup_dir(&self) -> &str {
        self.backup_dir.as_deref().unwrap_or(DEFAULT_BACKUP_DIR)
    }

    pub fn effective_cleanup_on_success(&self) -> bool {
        self.cleanup_on_success.unwrap_or(false)
    }
}
