//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, StrataErrorCode};

/// Errors that abort a whole scan. Per-descriptor failures are not errors;
/// the scanner skips those modules and records why.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Project root does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Project root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scan cancelled")]
    Cancelled,
}

impl StrataErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            _ => error_code::SCAN_ERROR,
        }
    }
}
