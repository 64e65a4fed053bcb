//! Fixer trait and fix result types.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_core::constants::{DEFAULT_DESCRIPTOR_FILE, DEFAULT_FIXER_PRIORITY};
use strata_core::errors::FixError;

use crate::backup::{BackupRecord, Transaction};
use crate::rules::Violation;

/// Outcome class of one fix attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixStatus {
    Fixed,
    DryRun,
    Skipped,
    NotFixable,
    Failed,
    ParseError,
    ValidationFailed,
}

impl FixStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::ParseError | Self::ValidationFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::DryRun => "dry_run",
            Self::Skipped => "skipped",
            Self::NotFixable => "not_fixable",
            Self::Failed => "failed",
            Self::ParseError => "parse_error",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

impl fmt::Display for FixStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of attempting to resolve one violation.
///
/// `modified_files` is only populated for `Fixed`; `diffs` for `Fixed` and
/// `DryRun`, and the dry-run diff is the one an apply run writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixResult {
    pub violation: Violation,
    pub status: FixStatus,
    pub description: String,
    pub modified_files: Vec<PathBuf>,
    pub diffs: Vec<String>,
    pub error: Option<String>,
    /// Name of the fixer that produced the result, if one ran.
    pub fixer: Option<String>,
}

impl FixResult {
    fn new(violation: &Violation, status: FixStatus, description: impl Into<String>) -> Self {
        Self {
            violation: violation.clone(),
            status,
            description: description.into(),
            modified_files: Vec::new(),
            diffs: Vec::new(),
            error: None,
            fixer: None,
        }
    }

    pub fn fixed(
        violation: &Violation,
        description: impl Into<String>,
        modified_files: Vec<PathBuf>,
        diffs: Vec<String>,
    ) -> Self {
        Self {
            modified_files,
            diffs,
            ..Self::new(violation, FixStatus::Fixed, description)
        }
    }

    pub fn dry_run(violation: &Violation, description: impl Into<String>, diffs: Vec<String>) -> Self {
        Self {
            diffs,
            ..Self::new(violation, FixStatus::DryRun, description)
        }
    }

    pub fn skipped(violation: &Violation, reason: impl Into<String>) -> Self {
        Self::new(violation, FixStatus::Skipped, reason)
    }

    pub fn not_fixable(violation: &Violation, reason: impl Into<String>) -> Self {
        Self::new(violation, FixStatus::NotFixable, reason)
    }

    pub fn failed(violation: &Violation, error: impl Into<String>) -> Self {
        Self::with_error(violation, FixStatus::Failed, error.into())
    }

    pub fn parse_error(violation: &Violation, error: impl Into<String>) -> Self {
        Self::with_error(violation, FixStatus::ParseError, error.into())
    }

    pub fn validation_failed(violation: &Violation, error: impl Into<String>) -> Self {
        Self::with_error(violation, FixStatus::ValidationFailed, error.into())
    }

    fn with_error(violation: &Violation, status: FixStatus, error: String) -> Self {
        Self {
            error: Some(error.clone()),
            ..Self::new(violation, status, error)
        }
    }

    /// Map a fixer error onto the matching failure status.
    pub fn from_error(violation: &Violation, error: &FixError) -> Self {
        match error {
            FixError::Parse(e) => Self::parse_error(violation, e.to_string()),
            FixError::ValidationFailed { .. } => Self::validation_failed(violation, error.to_string()),
            _ => Self::failed(violation, error.to_string()),
        }
    }

    pub fn with_fixer(mut self, name: impl Into<String>) -> Self {
        self.fixer = Some(name.into());
        self
    }
}

/// A component that edits files to resolve violations of specific rule ids.
///
/// `fix` must be idempotent: when the target condition no longer holds it
/// returns `Skipped("No changes needed")` without touching anything.
pub trait Fixer: Send + Sync {
    /// Unique name, used for administrative enable/disable.
    fn name(&self) -> &str;

    fn supported_rules(&self) -> &[&str];

    /// Higher runs first when several fixers support the same rule.
    fn priority(&self) -> i32 {
        DEFAULT_FIXER_PRIORITY
    }

    fn can_fix(&self, violation: &Violation) -> bool {
        self.supported_rules().contains(&violation.rule_id.as_str())
    }

    fn fix(&self, violation: &Violation, ctx: &mut FixerContext) -> Result<FixResult, FixError>;
}

/// Per-invocation context handed to a fixer.
#[derive(Debug)]
pub struct FixerContext {
    dry_run: bool,
    project_root: PathBuf,
    module_root: PathBuf,
    descriptor_file: String,
    transaction: Option<Transaction>,
}

impl FixerContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        Self {
            dry_run: false,
            module_root: project_root.clone(),
            project_root,
            descriptor_file: DEFAULT_DESCRIPTOR_FILE.to_string(),
            transaction: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_descriptor_file(mut self, name: impl Into<String>) -> Self {
        self.descriptor_file = name.into();
        self
    }

    pub fn with_module_root(mut self, module_root: impl Into<PathBuf>) -> Self {
        self.module_root = module_root.into();
        self
    }

    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transaction = Some(transaction);
        self
    }

    /// A fresh context for `violation`, without a transaction. The module
    /// root is the violation's location, or its parent when that is a file.
    pub fn for_violation(&self, violation: &Violation) -> Self {
        // Scanner locations already carry the root, relative or not.
        let location = if violation.location.is_absolute()
            || violation.location.starts_with(&self.project_root)
        {
            violation.location.clone()
        } else {
            self.project_root.join(&violation.location)
        };
        let module_root = if location.is_file() {
            location
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.project_root.clone())
        } else {
            location
        };
        Self {
            dry_run: self.dry_run,
            project_root: self.project_root.clone(),
            module_root,
            descriptor_file: self.descriptor_file.clone(),
            transaction: None,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn module_root(&self) -> &Path {
        &self.module_root
    }

    pub fn descriptor_file(&self) -> &str {
        &self.descriptor_file
    }

    /// The module's build descriptor.
    pub fn descriptor_path(&self) -> PathBuf {
        self.module_root.join(&self.descriptor_file)
    }

    /// `path` relative to the project root with `/` separators, for diff headers.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    pub fn take_transaction(&mut self) -> Option<Transaction> {
        self.transaction.take()
    }

    pub fn read_file(&self, path: &Path) -> Result<String, FixError> {
        fs::read_to_string(path).map_err(|source| FixError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Stage `path` in the open transaction.
    pub fn backup(&mut self, path: &Path) -> Result<BackupRecord, FixError> {
        let transaction = self
            .transaction
            .as_mut()
            .ok_or_else(|| FixError::NoTransaction {
                path: path.to_path_buf(),
            })?;
        Ok(transaction.backup(path)?)
    }

    /// Write `content` to `path`, staging the current bytes first. Refuses
    /// to write in dry-run mode or when the backup failed.
    pub fn write_file(&mut self, path: &Path, content: &str) -> Result<(), FixError> {
        if self.dry_run {
            return Err(FixError::Failed(format!(
                "refusing to write {} in dry-run mode",
                path.display()
            )));
        }
        let transaction = self
            .transaction
            .as_mut()
            .ok_or_else(|| FixError::NoTransaction {
                path: path.to_path_buf(),
            })?;

        if path.exists() {
            let record = transaction.backup(path)?;
            if !record.success {
                return Err(FixError::BackupFailed {
                    path: path.to_path_buf(),
                    message: record.message.unwrap_or_default(),
                });
            }
        } else {
            transaction.track_created(path)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| FixError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        fs::write(path, content).map_err(|source| FixError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
