//! Backup data types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Outcome of staging one file. An unsuccessful record is a reportable
/// result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub original: PathBuf,
    /// Staged copy. `None` for files the transaction created, which
    /// rollback deletes instead of restoring.
    pub backup: Option<PathBuf>,
    pub success: bool,
    pub message: Option<String>,
}

impl BackupRecord {
    pub fn staged(original: PathBuf, backup: PathBuf) -> Self {
        Self {
            original,
            backup: Some(backup),
            success: true,
            message: None,
        }
    }

    pub fn created(original: PathBuf) -> Self {
        Self {
            original,
            backup: None,
            success: true,
            message: Some("created by transaction".to_string()),
        }
    }

    pub fn failed(original: PathBuf, message: impl Into<String>) -> Self {
        Self {
            original,
            backup: None,
            success: false,
            message: Some(message.into()),
        }
    }

    /// Whether rollback has to delete rather than restore.
    pub fn is_created(&self) -> bool {
        self.success && self.backup.is_none()
    }
}

/// Outcome of restoring one file from its staged copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRecord {
    pub path: PathBuf,
    pub success: bool,
    pub message: Option<String>,
}

impl RestoreRecord {
    pub fn ok(path: PathBuf) -> Self {
        Self {
            path,
            success: true,
            message: None,
        }
    }

    pub fn failed(path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            path,
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Committed => write!(f, "committed"),
            Self::RolledBack => write!(f, "rolled_back"),
        }
    }
}
