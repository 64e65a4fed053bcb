//! Report generation errors.

use std::path::PathBuf;

use super::error_code::{self, StrataErrorCode};

/// Errors raised while writing or consolidating reports.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error writing report {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Report serialization failed: {0}")]
    Serialization(String),

    #[error("Cannot lock {path}: {source}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StrataErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Lock { .. } => error_code::LOCK_ERROR,
            _ => error_code::REPORT_ERROR,
        }
    }
}
