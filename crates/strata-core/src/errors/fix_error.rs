//! Fixer errors.

use std::path::PathBuf;

use super::error_code::{self, StrataErrorCode};
use super::{ParseError, TransactionError};

/// Errors raised inside a fixer invocation. The orchestrator turns each of
/// these into a failing `FixResult` and keeps going with the batch.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation failed for {path}: {message}")]
    ValidationFailed { path: PathBuf, message: String },

    #[error("Backup of {path} failed: {message}")]
    BackupFailed { path: PathBuf, message: String },

    #[error("Write to {path} requires an open transaction")]
    NoTransaction { path: PathBuf },

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Fix failed: {0}")]
    Failed(String),
}

impl StrataErrorCode for FixError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(e) => e.error_code(),
            Self::ValidationFailed { .. } => error_code::VALIDATION_FAILED,
            Self::BackupFailed { .. } => error_code::BACKUP_FAILED,
            Self::Transaction(e) => e.error_code(),
            _ => error_code::FIX_ERROR,
        }
    }
}
