//! Backup transaction errors.

use std::path::PathBuf;

use super::error_code::{self, StrataErrorCode};

/// Errors raised by the backup/transaction manager.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction {id} is not active (state: {state})")]
    NotActive { id: String, state: String },

    #[error("Transaction {id} is committed and cannot be rolled back")]
    RollbackAfterCommit { id: String },

    #[error("Rollback of transaction {id} failed for {} file(s): {}", .failures.len(), .failures.join("; "))]
    RollbackFailed { id: String, failures: Vec<String> },

    #[error("Staging directory must be a relative path of plain names inside the project root: {path}")]
    InvalidStagingDir { path: PathBuf },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TransactionError {
    /// A failed rollback leaves the filesystem in an unknown state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RollbackFailed { .. })
    }
}

impl StrataErrorCode for TransactionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RollbackFailed { .. } => error_code::ROLLBACK_FAILED,
            _ => error_code::TRANSACTION_ERROR,
        }
    }
}
